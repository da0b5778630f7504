//! App Router

use salvo::Router;

use crate::{coupons, orders, promos};

pub fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("promos")
                .put(promos::upsert::handler)
                .push(Router::with_path("search").post(promos::search::handler))
                .push(Router::with_path("usage").post(promos::usage::handler))
                .push(Router::with_path("{promo_id}").put(promos::upsert::by_id_handler)),
        )
        .push(Router::with_path("customers/{customer_id}/coupons").get(coupons::index::handler))
        .push(Router::with_path("orders/{order_id}/promo-credit").post(orders::credit::handler))
}

#[cfg(test)]
mod tests {
    use promo_engine::eligibility::Resolution;
    use promo_engine_app::domain::promos::MockPromotionsService;
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::promotions_service;

    use super::*;

    #[tokio::test]
    async fn test_search_is_not_shadowed_by_promo_id_route() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_search_promos()
            .once()
            .returning(|_| Resolution::default());

        promotions.expect_upsert_promo().never();

        let mut res = TestClient::post("http://example.com/promos/search")
            .json(&json!({}))
            .send(&promotions_service(promotions, app_router()))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.get("promos"), Some(&json!([])));

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_route_passes_customer_id() {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_list_coupons()
            .once()
            .withf(|customer_id, _, _| {
                customer_id.as_ref().map(|id| id.as_str()) == Some("customer-7")
            })
            .returning(|_, _, _| Vec::new());

        let res = TestClient::get("http://example.com/customers/customer-7/coupons")
            .send(&promotions_service(promotions, app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }
}
