//! In-memory orders repository

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use super::OrdersRepository;
use crate::domain::{orders::Order, promos::RepositoryError};

#[derive(Debug, Default)]
pub struct InMemoryOrdersRepository {
    orders: RwLock<FxHashMap<String, Order>>,
}

impl InMemoryOrdersRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrdersRepository for InMemoryOrdersRepository {
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;

        Ok(orders.get(order_id).cloned())
    }

    async fn save_order(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;

        orders.insert(order.order_id.clone(), order.clone());

        Ok(order)
    }
}
