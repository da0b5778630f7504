//! Cancelled Order Credit Handler

use std::sync::Arc;

use salvo::prelude::*;

use promo_engine::user_promos::UserPromo;
use promo_engine_app::domain::orders::OrderCredit;

use crate::{extensions::*, promos::into_status_error, state::State};

/// Cancelled Order Credit Handler
///
/// Returns the redemption of the first promo code used on a cancelled order.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<UserPromo>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order_id = req
        .param::<String>("order_id")
        .ok_or_else(|| StatusError::bad_request().brief("Missing order id"))?;

    let credit = state
        .promotions
        .credit_cancelled_order(&order_id)
        .await
        .map_err(into_status_error)?;

    let brief = credit.message().unwrap_or_default();

    match credit {
        OrderCredit::Credited(row) => Ok(Json(row)),
        OrderCredit::NotApplied { .. } => Err(StatusError::conflict().brief(brief)),
    }
}
