//! Promo Repositories
//!
//! Document-store seam for promos and per-customer promo rows. Every counter write is a single
//! conditional mutation: callers never read a count and write it back.

use async_trait::async_trait;
use mockall::automock;
use promo_engine::{
    conditions::PromoFilter,
    context::CustomerId,
    promos::{Promo, PromoId},
    user_promos::UserPromo,
};

use crate::domain::promos::errors::RepositoryError;

mod memory;
mod postgres;

pub use memory::InMemoryPromoRepository;
pub use postgres::PgPromoRepository;

#[automock]
#[async_trait]
pub trait PromoRepository: Send + Sync {
    /// Promos passing every stored-field condition of `filter`, by priority then id.
    ///
    /// Post-retrieval conditions are left to the caller.
    async fn find_promos(&self, filter: &PromoFilter) -> Result<Vec<Promo>, RepositoryError>;

    async fn find_promo(&self, promo_id: &PromoId) -> Result<Option<Promo>, RepositoryError>;

    /// Insert or replace a promo keyed by its id.
    async fn upsert_promo(&self, promo: Promo) -> Result<Promo, RepositoryError>;

    /// Move a promo's global used count; `None` when the promo no longer exists.
    async fn increment_used_count(
        &self,
        promo_id: &PromoId,
        delta: i64,
    ) -> Result<Option<Promo>, RepositoryError>;

    /// A customer's rows, by priority then promo id.
    async fn find_user_promos(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<UserPromo>, RepositoryError>;

    async fn find_user_promo(
        &self,
        customer_id: &CustomerId,
        promo_id: &PromoId,
    ) -> Result<Option<UserPromo>, RepositoryError>;

    async fn find_user_promo_by_code(
        &self,
        customer_id: &CustomerId,
        promo_code: &str,
    ) -> Result<Option<UserPromo>, RepositoryError>;

    /// Store a first tracked row.
    ///
    /// Replaces an existing row only when it carries no count; `None` when it already does.
    async fn create_user_promo(&self, row: UserPromo)
    -> Result<Option<UserPromo>, RepositoryError>;

    /// Replace a row's fields and move its count by `delta`, only while the result stays within
    /// `[0, ceiling]`; `None` when the guard fails or the row has no count.
    async fn adjust_user_promo(
        &self,
        row: UserPromo,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<UserPromo>, RepositoryError>;

    /// Upsert a row's denormalised fields, keeping any stored count.
    async fn refresh_user_promo(&self, row: UserPromo) -> Result<UserPromo, RepositoryError>;
}

