//! Catalog resolution tests

use jiff::Timestamp;
use promo_engine::{
    catalog::Catalog,
    conditions::QueryConditionBuilder,
    context::{CustomerId, RequestContext, SearchRequest, UserClaims, UserProfile},
    eligibility::{EligibilityResolver, Resolution},
    locale::Locale,
    shipping::{DiscountApplier, ReferencePricePolicy},
    user_promos::UserPromo,
};
use rust_decimal_macros::dec;
use testresult::TestResult;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures");

fn now() -> Result<Timestamp, jiff::Error> {
    "2026-06-18T12:00:00Z".parse()
}

fn rows_for(catalog: &Catalog, customer_id: Option<&CustomerId>) -> Vec<UserPromo> {
    catalog
        .user_promos
        .iter()
        .filter(|row| Some(&row.customer_id) == customer_id)
        .cloned()
        .collect()
}

fn resolve(request: &SearchRequest) -> TestResult<Resolution> {
    let catalog = Catalog::load(FIXTURES, "checkout")?;
    let ctx = request.to_context(now()?);
    let rows = rows_for(&catalog, ctx.customer_id.as_ref());

    Ok(EligibilityResolver::default().resolve_snapshot(&ctx, catalog.promos, rows))
}

fn ids(resolution: &Resolution) -> Vec<&str> {
    resolution
        .promos
        .iter()
        .map(|resolved| resolved.promo.promo_id.as_str())
        .collect()
}

fn existing(customer_id: &str) -> SearchRequest {
    SearchRequest {
        user_claims: Some(UserClaims {
            customer_id: Some(CustomerId::new(customer_id)),
            scope: vec!["orders".to_string()],
        }),
        ..SearchRequest::default()
    }
}

#[test]
fn guests_get_free_delivery_first() -> TestResult {
    let resolution = resolve(&SearchRequest {
        shipping: Some(dec!(3.99)),
        ..SearchRequest::default()
    })?;

    assert_eq!(
        ids(&resolution),
        vec!["free-delivery", "basket-ten", "half-delivery", "store-special", "rolling"]
    );
    assert_eq!(resolution.promo_shipping, Some(dec!(0)));
    assert_eq!(resolution.original_shipping, Some(dec!(1.995)));

    Ok(())
}

#[test]
fn delivery_fee_replaces_shipping() -> TestResult {
    let resolution = resolve(&SearchRequest {
        shipping: Some(dec!(3.99)),
        delivery_fee: Some(dec!(5)),
        avoid_original_shipping_cal: Some(true),
        ..SearchRequest::default()
    })?;

    assert_eq!(resolution.promo_shipping, Some(dec!(0)));
    assert_eq!(resolution.original_shipping, Some(dec!(5)));

    Ok(())
}

#[test]
fn store_restricted_promos_need_a_listed_store() -> TestResult {
    let elsewhere = resolve(&SearchRequest {
        store_id: Some("store-1".to_string()),
        ..SearchRequest::default()
    })?;

    let listed = resolve(&SearchRequest {
        store_id: Some("store-42".to_string()),
        ..SearchRequest::default()
    })?;

    assert!(!ids(&elsewhere).contains(&"store-special"));
    assert!(ids(&listed).contains(&"store-special"));

    Ok(())
}

#[test]
fn inactive_ended_and_sold_out_promos_are_never_served() -> TestResult {
    let resolution = resolve(&existing("customer-2"))?;

    for hidden in ["retired", "spring", "sold-out", "canada"] {
        assert!(
            !ids(&resolution).contains(&hidden),
            "{hidden} should not be served: {:?}",
            ids(&resolution)
        );
    }

    Ok(())
}

#[test]
fn new_customers_see_every_existing_user_promo() -> TestResult {
    let resolution = resolve(&SearchRequest {
        shipping: Some(dec!(3.99)),
        ..existing("customer-2")
    })?;

    assert_eq!(
        ids(&resolution),
        vec!["free-delivery", "basket-ten", "store-special", "welcome", "loyalty", "rolling"]
    );

    let rolling = resolution
        .summaries()
        .into_iter()
        .find(|summary| summary.promo_id.as_str() == "rolling");

    assert_eq!(
        rolling.and_then(|summary| summary.end_date),
        Some("2026-06-25T12:00:00Z".parse()?)
    );

    Ok(())
}

#[test]
fn returning_customers_get_their_personal_state() -> TestResult {
    let resolution = resolve(&SearchRequest {
        shipping: Some(dec!(3.99)),
        ..existing("customer-1")
    })?;

    assert_eq!(
        ids(&resolution),
        vec!["free-delivery", "basket-ten", "store-special", "rolling"]
    );

    let rolling = resolution
        .summaries()
        .into_iter()
        .find(|summary| summary.promo_id.as_str() == "rolling");

    assert_eq!(rolling.as_ref().and_then(|s| s.available_count), Some(2));
    assert_eq!(
        rolling.and_then(|s| s.end_date),
        Some("2026-06-20T00:00:00Z".parse()?)
    );

    Ok(())
}

#[test]
fn profiles_identify_customers_without_claims() -> TestResult {
    let from_profile = resolve(&SearchRequest {
        user_profile: Some(UserProfile {
            customer_id: Some(CustomerId::new("customer-1")),
            is_guest: Some("N".to_string()),
        }),
        ..SearchRequest::default()
    })?;

    let from_claims = resolve(&existing("customer-1"))?;

    assert_eq!(ids(&from_profile), ids(&from_claims));

    Ok(())
}

#[test]
fn resolution_is_idempotent() -> TestResult {
    let request = SearchRequest {
        shipping: Some(dec!(3.99)),
        store_id: Some("store-42".to_string()),
        ..existing("customer-1")
    };

    assert_eq!(resolve(&request)?, resolve(&request)?);

    Ok(())
}

#[test]
fn countries_are_matched_exactly() -> TestResult {
    let catalog = Catalog::load(FIXTURES, "checkout")?;

    let resolver = EligibilityResolver::new(
        QueryConditionBuilder::new(&Locale::default()),
        DiscountApplier::new(ReferencePricePolicy::Undiscounted),
    );

    let ctx = RequestContext {
        country: Some("CA".to_string()),
        shipping: Some(dec!(4.99)),
        ..RequestContext::anonymous(now()?)
    };

    let resolution = resolver.resolve_snapshot(&ctx, catalog.promos, Vec::new());

    assert_eq!(ids(&resolution), vec!["canada"]);
    assert_eq!(resolution.promo_shipping, Some(dec!(0)));
    assert_eq!(resolution.original_shipping, Some(dec!(4.99)));

    Ok(())
}
