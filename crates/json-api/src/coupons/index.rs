//! Customer Coupons Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use promo_engine::{context::CustomerId, coupons::Coupon};

use crate::{extensions::*, state::State};

/// Customer Coupons Handler
///
/// Lists the coupons a customer holds or may claim; failures are served as an empty list.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Coupon>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let customer_id = req
        .param::<String>("customer_id")
        .filter(|customer_id| !customer_id.trim().is_empty())
        .map(CustomerId::new);

    let is_guest = req
        .query::<String>("guest")
        .map(|value| value.parse::<bool>())
        .transpose()
        .or_400("could not parse \"guest\" query parameter")?;

    let coupons = state
        .promotions
        .list_coupons(customer_id, is_guest.unwrap_or(false), Timestamp::now())
        .await;

    Ok(Json(coupons))
}
