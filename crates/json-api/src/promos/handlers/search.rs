//! Search Promos Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use promo_engine::{context::SearchRequest, eligibility::PromoSummary};

use crate::{extensions::*, state::State};

/// The search request echoed back with the promos it is entitled to.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(flatten)]
    pub request: SearchRequest,

    /// Resolved promos in serving order
    pub promos: Vec<PromoSummary>,

    /// Delivery fee after the leading shipping promo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_shipping: Option<Decimal>,

    /// Delivery fee shown as the pre-discount reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_shipping: Option<Decimal>,
}

/// Search Promos Handler
///
/// Resolution failures are served as an empty promo list.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<SearchResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let mut request: SearchRequest = req
        .parse_json()
        .await
        .or_400("Malformed search request")?;

    request.country = Some(req.resolve_country(&state.locale, request.country.as_deref()));

    let resolution = state.promotions.search_promos(&request).await;

    Ok(Json(SearchResponse {
        promos: resolution.summaries(),
        promo_shipping: resolution.promo_shipping,
        original_shipping: resolution.original_shipping,
        request,
    }))
}

#[cfg(test)]
mod tests {
    use promo_engine::{
        context::CustomerId,
        eligibility::{ResolvedPromo, Resolution},
    };
    use promo_engine_app::domain::promos::MockPromotionsService;
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{make_promo, promotions_service};

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(promotions, Router::with_path("promos/search").post(handler))
    }

    #[tokio::test]
    async fn test_search_echoes_request_with_promos() -> TestResult {
        let promo = make_promo("free-delivery")?;

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_search_promos()
            .once()
            .withf(|request| {
                request.country.as_deref() == Some("CA")
                    && request.identity().1 == Some(CustomerId::new("customer-1"))
            })
            .return_once(move |_| Resolution {
                promos: vec![ResolvedPromo::new(promo)],
                promo_shipping: Some(dec!(0)),
                original_shipping: Some(dec!(3.99)),
                ..Resolution::default()
            });

        let mut res = TestClient::post("http://example.com/promos/search")
            .add_header(COUNTRY_HEADER, "CA", true)
            .json(&json!({
                "user_claims": { "customer_id": "customer-1", "scope": [] },
                "store_id": "store-42",
                "delivery_fee": 3.99
            }))
            .send(&make_service(promotions))
            .await;

        let body: SearchResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.request.store_id.as_deref(), Some("store-42"));
        assert_eq!(body.request.country.as_deref(), Some("CA"));
        assert_eq!(
            body.promos.first().map(|promo| promo.promo_code.as_str()),
            Some("FREE-DELIVERY")
        );
        assert_eq!(body.promo_shipping, Some(dec!(0)));
        assert_eq!(body.original_shipping, Some(dec!(3.99)));

        Ok(())
    }

    #[tokio::test]
    async fn test_search_without_promos_omits_shipping() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_search_promos()
            .once()
            .withf(|request| request.country.as_deref() == Some("US"))
            .returning(|_| Resolution::default());

        let mut res = TestClient::post("http://example.com/promos/search")
            .json(&json!({ "country": "GB" }))
            .send(&make_service(promotions))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body.get("promos"), Some(&json!([])));
        assert!(body.get("promo_shipping").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_search_malformed_body_returns_400() {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_search_promos().never();

        let res = TestClient::post("http://example.com/promos/search")
            .json(&json!({ "user_claims": "customer-1" }))
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
