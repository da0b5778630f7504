//! Promotions service errors as HTTP errors.

use salvo::http::StatusError;
use tracing::error;

use promo_engine_app::domain::promos::{PromotionsServiceError, RepositoryError};

pub(crate) fn into_status_error(error: PromotionsServiceError) -> StatusError {
    match error {
        PromotionsServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PromotionsServiceError::Ledger(source) => {
            StatusError::conflict().brief(source.to_string())
        }
        PromotionsServiceError::OrderNotFound(order_id) => {
            StatusError::not_found().brief(format!("no promotions found for order {order_id}"))
        }
        PromotionsServiceError::Repository(RepositoryError::AlreadyExists) => {
            StatusError::conflict().brief("Promo already exists")
        }
        PromotionsServiceError::Repository(RepositoryError::InvalidData) => {
            StatusError::bad_request().brief("Invalid promo payload")
        }
        PromotionsServiceError::Repository(RepositoryError::NotFound) => StatusError::not_found(),
        PromotionsServiceError::Repository(source) => {
            error!("promotions repository failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
