//! Upsert Promo Handlers

use std::sync::Arc;

use salvo::prelude::*;

use promo_engine::{
    promos::{Promo, PromoId},
    validation::PromoDraft,
};

use crate::{extensions::*, promos::into_status_error, state::State};

async fn upsert(
    req: &mut Request,
    depot: &mut Depot,
    promo_id: Option<PromoId>,
) -> Result<Json<Promo>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let mut draft: PromoDraft = req.parse_json().await.or_400("Malformed promo payload")?;

    if promo_id.is_some() {
        draft.promo_id = promo_id;
    }

    if draft.country.is_some() || req.header::<String>(COUNTRY_HEADER).is_some() {
        draft.country = Some(req.resolve_country(&state.locale, draft.country.as_deref()));
    }

    let promo = state
        .promotions
        .upsert_promo(draft)
        .await
        .map_err(into_status_error)?;

    Ok(Json(promo))
}

/// Upsert Promo Handler
///
/// Stores a promo, generating its id when the payload has none.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Promo>, StatusError> {
    upsert(req, depot, None).await
}

/// Upsert Promo By Id Handler
///
/// Stores a promo under the id in the path.
#[handler]
pub(crate) async fn by_id_handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Promo>, StatusError> {
    let promo_id = req
        .param::<String>("promo_id")
        .map(PromoId::new)
        .ok_or_else(|| StatusError::bad_request().brief("Missing promo id"))?;

    upsert(req, depot, Some(promo_id)).await
}
