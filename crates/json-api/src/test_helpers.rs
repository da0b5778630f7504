//! Test helpers.

use std::sync::Arc;

use promo_engine::{
    context::CustomerId,
    coupons::Coupon,
    locale::Locale,
    promos::{Promo, PromoId, PromoType},
    user_promos::UserPromo,
    validation::{PromoDraft, ValidationError},
};
use promo_engine_app::domain::promos::MockPromotionsService;
use salvo::{affix_state::inject, prelude::*};

use crate::state::State;

pub(crate) fn customer() -> CustomerId {
    CustomerId::new("customer-1")
}

/// An active checkout promo whose code is the upper-cased id.
pub(crate) fn make_promo(promo_id: &str) -> Result<Promo, ValidationError> {
    PromoDraft {
        promo_id: Some(PromoId::new(promo_id)),
        promo_code: Some(promo_id.to_uppercase()),
        name: Some(format!("{promo_id} name")),
        description: Some(format!("{promo_id} description")),
        promo_type: Some(PromoType::Checkout),
        country: Some("US".to_string()),
        is_active: Some(true),
        priority: Some(1),
        ..PromoDraft::default()
    }
    .validate(&Locale::default())
}

pub(crate) fn make_user_promo(
    promo_id: &str,
    available_count: Option<i64>,
) -> Result<UserPromo, ValidationError> {
    let promo = make_promo(promo_id)?;

    Ok(UserPromo {
        available_count,
        ..UserPromo::from_promo(customer(), &promo)
    })
}

pub(crate) fn make_coupon(promo_id: &str) -> Coupon {
    Coupon {
        customer_id: customer(),
        promo_id: PromoId::new(promo_id),
        promo_code: promo_id.to_uppercase(),
        name: String::new(),
        description: String::new(),
        start_date: None,
        end_date: None,
        priority: 1,
        usage_limit: None,
        available_count: Some(1),
    }
}

pub(crate) fn state_with_promotions(promotions: MockPromotionsService) -> Arc<State> {
    Arc::new(State::new(Arc::new(promotions), Locale::default()))
}

pub(crate) fn promotions_service(promotions: MockPromotionsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_promotions(promotions)))
            .push(route),
    )
}
