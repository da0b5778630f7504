//! Promotions service errors.

use promo_engine::{ledger::LedgerError, validation::ValidationError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document already exists")]
    AlreadyExists,

    #[error("document not found")]
    NotFound,

    #[error("invalid data")]
    InvalidData,

    #[error("malformed stored document")]
    Document(#[source] serde_json::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for RepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        Self::Document(error)
    }
}

#[derive(Debug, Error)]
pub enum PromotionsServiceError {
    #[error("invalid promo")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("no promotions found for order {0}")]
    OrderNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            RepositoryError::from(Error::RowNotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn pool_errors_are_storage_errors() {
        assert!(matches!(
            RepositoryError::from(Error::PoolTimedOut),
            RepositoryError::Sql(_)
        ));
    }

    #[test]
    fn missing_orders_name_the_order() {
        let error = PromotionsServiceError::OrderNotFound("order-1".to_string());

        assert_eq!(error.to_string(), "no promotions found for order order-1");
    }
}
