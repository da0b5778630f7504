//! In-memory promo repository

use async_trait::async_trait;
use promo_engine::{
    catalog::Catalog,
    conditions::PromoFilter,
    context::CustomerId,
    promos::{Promo, PromoId},
    user_promos::UserPromo,
};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use super::PromoRepository;
use crate::domain::promos::errors::RepositoryError;

type UserPromoKey = (CustomerId, PromoId);

/// Map-backed store with the same conditional write semantics as the `PostgreSQL` store.
#[derive(Debug, Default)]
pub struct InMemoryPromoRepository {
    promos: RwLock<FxHashMap<PromoId, Promo>>,
    user_promos: RwLock<FxHashMap<UserPromoKey, UserPromo>>,
}

impl InMemoryPromoRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a loaded catalog.
    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        let promos = catalog
            .promos
            .into_iter()
            .map(|promo| (promo.promo_id.clone(), promo))
            .collect();

        let user_promos = catalog
            .user_promos
            .into_iter()
            .map(|row| ((row.customer_id.clone(), row.promo_id.clone()), row))
            .collect();

        Self {
            promos: RwLock::new(promos),
            user_promos: RwLock::new(user_promos),
        }
    }
}

fn key(customer_id: &CustomerId, promo_id: &PromoId) -> UserPromoKey {
    (customer_id.clone(), promo_id.clone())
}

#[async_trait]
impl PromoRepository for InMemoryPromoRepository {
    async fn find_promos(&self, filter: &PromoFilter) -> Result<Vec<Promo>, RepositoryError> {
        let promos = self.promos.read().await;

        let mut found: Vec<Promo> = promos
            .values()
            .filter(|promo| filter.matches_stored(promo))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.promo_id.cmp(&b.promo_id))
        });

        Ok(found)
    }

    async fn find_promo(&self, promo_id: &PromoId) -> Result<Option<Promo>, RepositoryError> {
        let promos = self.promos.read().await;

        Ok(promos.get(promo_id).cloned())
    }

    async fn upsert_promo(&self, promo: Promo) -> Result<Promo, RepositoryError> {
        let mut promos = self.promos.write().await;

        promos.insert(promo.promo_id.clone(), promo.clone());

        Ok(promo)
    }

    async fn increment_used_count(
        &self,
        promo_id: &PromoId,
        delta: i64,
    ) -> Result<Option<Promo>, RepositoryError> {
        let mut promos = self.promos.write().await;

        Ok(promos.get_mut(promo_id).map(|promo| {
            promo.usage_limit.used_count = promo.usage_limit.used_count.saturating_add(delta);
            promo.clone()
        }))
    }

    async fn find_user_promos(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<UserPromo>, RepositoryError> {
        let user_promos = self.user_promos.read().await;

        let mut rows: Vec<UserPromo> = user_promos
            .values()
            .filter(|row| row.customer_id == *customer_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.promo_id.cmp(&b.promo_id))
        });

        Ok(rows)
    }

    async fn find_user_promo(
        &self,
        customer_id: &CustomerId,
        promo_id: &PromoId,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        let user_promos = self.user_promos.read().await;

        Ok(user_promos.get(&key(customer_id, promo_id)).cloned())
    }

    async fn find_user_promo_by_code(
        &self,
        customer_id: &CustomerId,
        promo_code: &str,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        let user_promos = self.user_promos.read().await;

        Ok(user_promos
            .values()
            .filter(|row| row.customer_id == *customer_id && row.promo_code == promo_code)
            .min_by(|a, b| a.promo_id.cmp(&b.promo_id))
            .cloned())
    }

    async fn create_user_promo(
        &self,
        row: UserPromo,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        let mut user_promos = self.user_promos.write().await;
        let key = key(&row.customer_id, &row.promo_id);

        if user_promos
            .get(&key)
            .is_some_and(|existing| existing.available_count.is_some())
        {
            return Ok(None);
        }

        user_promos.insert(key, row.clone());

        Ok(Some(row))
    }

    async fn adjust_user_promo(
        &self,
        row: UserPromo,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        let mut user_promos = self.user_promos.write().await;

        let Some(existing) = user_promos.get_mut(&key(&row.customer_id, &row.promo_id)) else {
            return Ok(None);
        };

        let Some(next) = existing
            .available_count
            .and_then(|count| count.checked_add(delta))
            .filter(|next| (0..=ceiling).contains(next))
        else {
            return Ok(None);
        };

        *existing = UserPromo {
            available_count: Some(next),
            ..row
        };

        Ok(Some(existing.clone()))
    }

    async fn refresh_user_promo(&self, row: UserPromo) -> Result<UserPromo, RepositoryError> {
        let mut user_promos = self.user_promos.write().await;
        let key = key(&row.customer_id, &row.promo_id);

        let available_count = row
            .available_count
            .or_else(|| user_promos.get(&key).and_then(|existing| existing.available_count));

        let stored = UserPromo {
            available_count,
            ..row
        };

        user_promos.insert(key, stored.clone());

        Ok(stored)
    }
}
