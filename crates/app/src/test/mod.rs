//! Shared fixtures for service-level tests.

use std::sync::Arc;

use jiff::Timestamp;
use promo_engine::{
    catalog::{Catalog, CatalogError},
    context::CustomerId,
    eligibility::PromoSummary,
    promos::PromoId,
};

use crate::{
    domain::{
        orders::InMemoryOrdersRepository,
        promos::{InMemoryPromoRepository, PromoEngine},
    },
    settings::EngineSettings,
};

pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures");

const CHECKOUT_CATALOG: &str = "checkout";

/// 2026-06-18T12:00:00Z, inside every fixture window.
pub fn now() -> Timestamp {
    Timestamp::constant(1_781_784_000, 0)
}

/// Customer holding the fixture's user promo rows.
pub fn customer() -> CustomerId {
    CustomerId::new("customer-1")
}

pub fn checkout_repository() -> Result<InMemoryPromoRepository, CatalogError> {
    Catalog::load(FIXTURES, CHECKOUT_CATALOG).map(InMemoryPromoRepository::from_catalog)
}

/// Summary of a fixture promo as a checkout would echo it back.
pub fn summary(promo_id: &str) -> PromoSummary {
    PromoSummary {
        promo_id: PromoId::new(promo_id),
        promo_code: promo_id.to_uppercase(),
        name: String::new(),
        description: String::new(),
        start_date: None,
        end_date: None,
        available_count: None,
    }
}

/// Engine over the checkout fixture with handles on both stores.
pub struct TestContext {
    pub promos: Arc<InMemoryPromoRepository>,
    pub orders: Arc<InMemoryOrdersRepository>,
    pub engine: PromoEngine,
}

impl TestContext {
    pub fn new() -> Result<Self, CatalogError> {
        let promos = Arc::new(checkout_repository()?);
        let orders = Arc::new(InMemoryOrdersRepository::new());

        let engine = PromoEngine::new(promos.clone(), orders.clone(), EngineSettings::default());

        Ok(Self {
            promos,
            orders,
            engine,
        })
    }
}
