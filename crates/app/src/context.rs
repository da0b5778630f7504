//! App Context

use std::sync::Arc;

use promo_engine::catalog::Catalog;
use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    database::{self, Db, RepositoryConfig},
    domain::{
        orders::{InMemoryOrdersRepository, OrdersRepository, PgOrdersRepository},
        promos::{
            InMemoryPromoRepository, PgPromoRepository, PromoEngine, PromoRepository,
            PromotionsService,
        },
    },
    settings::EngineSettings,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migration(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub promotions: Arc<dyn PromotionsService>,
    pub promos: Arc<dyn PromoRepository>,
    pub orders: Arc<dyn OrdersRepository>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(
        url: &str,
        config: RepositoryConfig,
        settings: EngineSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migration)?;

        let db = Db::new(pool);

        Ok(Self::from_repositories(
            Arc::new(PgPromoRepository::new(db.clone(), config)),
            Arc::new(PgOrdersRepository::new(db, config)),
            settings,
        ))
    }

    /// Context over map-backed stores seeded from a catalog.
    #[must_use]
    pub fn in_memory(catalog: Catalog, settings: EngineSettings) -> Self {
        Self::from_repositories(
            Arc::new(InMemoryPromoRepository::from_catalog(catalog)),
            Arc::new(InMemoryOrdersRepository::new()),
            settings,
        )
    }

    fn from_repositories(
        promos: Arc<dyn PromoRepository>,
        orders: Arc<dyn OrdersRepository>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            promotions: Arc::new(PromoEngine::new(promos.clone(), orders.clone(), settings)),
            promos,
            orders,
        }
    }
}
