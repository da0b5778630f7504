//! Promotions

mod errors;
mod repositories;
mod resolution;
pub mod service;
mod usage;

pub use errors::{PromotionsServiceError, RepositoryError};
pub use repositories::{
    InMemoryPromoRepository, MockPromoRepository, PgPromoRepository, PromoRepository,
};
pub use service::{MockPromotionsService, PromoEngine, PromotionsService};
