//! Record Promo Usage Handler

use std::sync::Arc;

use salvo::prelude::*;

use promo_engine::{ledger::UsageRequest, user_promos::UserPromo};

use crate::{extensions::*, promos::into_status_error, state::State};

/// Record Promo Usage Handler
///
/// Consumes or credits back the customer's redemptions and returns the rows that changed.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<UserPromo>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let mut request: UsageRequest = req
        .parse_json()
        .await
        .or_400("Malformed usage request")?;

    request.search.country =
        Some(req.resolve_country(&state.locale, request.search.country.as_deref()));

    let updated = state
        .promotions
        .record_usage(&request)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated))
}
