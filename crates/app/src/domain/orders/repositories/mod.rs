//! Orders Repositories

use async_trait::async_trait;
use mockall::automock;

use super::Order;
use crate::domain::promos::RepositoryError;

mod memory;
mod postgres;

pub use memory::InMemoryOrdersRepository;
pub use postgres::PgOrdersRepository;

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError>;

    async fn save_order(&self, order: Order) -> Result<Order, RepositoryError>;
}
