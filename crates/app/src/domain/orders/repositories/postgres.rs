//! `PostgreSQL` Orders Repository

use async_trait::async_trait;
use sqlx::{Postgres, query_scalar, types::Json};
use tracing::debug;

use super::OrdersRepository;
use crate::{
    database::{Db, RepositoryConfig},
    domain::{orders::Order, promos::RepositoryError},
};

const ORDERS_TABLE: &str = "orders";

const FIND_ORDER_SQL: &str = include_str!("../sql/find_order.sql");
const SAVE_ORDER_SQL: &str = include_str!("../sql/save_order.sql");

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
    config: RepositoryConfig,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db, config: RepositoryConfig) -> Self {
        Self { db, config }
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError> {
        if self.config.log_statements {
            debug!(table = ORDERS_TABLE, statement = FIND_ORDER_SQL, "executing statement");
        }

        let order = query_scalar::<Postgres, Json<Order>>(FIND_ORDER_SQL)
            .bind(order_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(order.map(|Json(order)| order))
    }

    async fn save_order(&self, order: Order) -> Result<Order, RepositoryError> {
        if self.config.log_statements {
            debug!(table = ORDERS_TABLE, statement = SAVE_ORDER_SQL, "executing statement");
        }

        let document = serde_json::to_value(&order)?;

        let Json(stored) = query_scalar::<Postgres, Json<Order>>(SAVE_ORDER_SQL)
            .bind(order.order_id.as_str())
            .bind(document)
            .fetch_one(self.db.pool())
            .await?;

        Ok(stored)
    }
}
