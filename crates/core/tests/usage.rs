//! Usage planning and coupon listing against the checkout catalog

use jiff::Timestamp;
use promo_engine::{
    catalog::Catalog,
    conditions::QueryConditionBuilder,
    context::{CustomerId, SearchRequest, UserClaims},
    coupons::list_coupons,
    eligibility::EligibilityResolver,
    ledger::{LedgerEntry, UsageDirection, UserPromoWrite, plan_usage},
};
use rust_decimal_macros::dec;
use testresult::TestResult;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures");

fn now() -> Result<Timestamp, jiff::Error> {
    "2026-06-18T12:00:00Z".parse()
}

#[test]
fn checkout_consumes_resolved_promos() -> TestResult {
    let catalog = Catalog::load(FIXTURES, "checkout")?;
    let customer_id = CustomerId::new("customer-2");

    let request = SearchRequest {
        user_claims: Some(UserClaims {
            customer_id: Some(customer_id.clone()),
            scope: Vec::new(),
        }),
        shipping: Some(dec!(3.99)),
        ..SearchRequest::default()
    };

    let resolution = EligibilityResolver::default().resolve_snapshot(
        &request.to_context(now()?),
        catalog.promos.clone(),
        Vec::new(),
    );

    let entries: Vec<LedgerEntry> = resolution
        .summaries()
        .into_iter()
        .map(|requested| LedgerEntry {
            promo: catalog
                .promos
                .iter()
                .find(|promo| promo.promo_id == requested.promo_id)
                .cloned(),
            requested,
            existing: None,
        })
        .collect();

    let plan = plan_usage(UsageDirection::Consume, &customer_id, &entries)?;

    assert_eq!(
        plan.global.as_ref().map(|global| global.promo_id.as_str()),
        Some("free-delivery")
    );
    assert_eq!(plan.writes.len(), entries.len());

    let welcome = plan
        .writes
        .iter()
        .find(|write| write.row().promo_id.as_str() == "welcome");

    assert!(
        matches!(welcome, Some(UserPromoWrite::Create { row }) if row.available_count == Some(0)),
        "expected the welcome coupon to be used up, got {welcome:?}"
    );

    let rolling = plan
        .writes
        .iter()
        .find(|write| write.row().promo_id.as_str() == "rolling");

    assert_eq!(
        rolling.and_then(|write| write.row().end_date),
        Some("2026-06-25T12:00:00Z".parse()?)
    );

    Ok(())
}

#[test]
fn credit_back_restores_a_used_coupon() -> TestResult {
    let catalog = Catalog::load(FIXTURES, "checkout")?;
    let customer_id = CustomerId::new("customer-1");

    let welcome = catalog
        .promos
        .iter()
        .find(|promo| promo.promo_id.as_str() == "welcome")
        .cloned();

    let row = catalog
        .user_promos
        .iter()
        .find(|row| row.promo_id.as_str() == "welcome")
        .cloned();

    let entries = vec![LedgerEntry {
        requested: promo_engine::eligibility::PromoSummary {
            promo_id: "welcome".into(),
            promo_code: "WELCOME".to_string(),
            name: String::new(),
            description: String::new(),
            start_date: None,
            end_date: None,
            available_count: None,
        },
        promo: welcome,
        existing: row,
    }];

    let credited = plan_usage(UsageDirection::CreditBack, &customer_id, &entries)?;
    let consumed = plan_usage(UsageDirection::Consume, &customer_id, &entries)?;

    assert_eq!(
        credited.writes.first().and_then(|write| write.row().available_count),
        Some(1)
    );
    assert!(consumed.writes.is_empty(), "{consumed:?}");
    assert_eq!(consumed.global.map(|global| global.delta), Some(1));

    Ok(())
}

#[test]
fn coupons_merge_held_and_offered() -> TestResult {
    let catalog = Catalog::load(FIXTURES, "checkout")?;
    let builder = QueryConditionBuilder::default();

    let fresh = list_coupons(
        &builder,
        Some(&CustomerId::new("customer-2")),
        false,
        now()?,
        &catalog.promos,
        &catalog.user_promos,
    );

    let used = list_coupons(
        &builder,
        Some(&CustomerId::new("customer-1")),
        false,
        now()?,
        &catalog.promos,
        &catalog.user_promos,
    );

    let guests = list_coupons(
        &builder,
        Some(&CustomerId::new("customer-2")),
        true,
        now()?,
        &catalog.promos,
        &catalog.user_promos,
    );

    assert_eq!(
        fresh
            .iter()
            .map(|coupon| (coupon.promo_id.as_str(), coupon.available_count))
            .collect::<Vec<_>>(),
        vec![("welcome", Some(1))]
    );
    assert!(used.is_empty(), "{used:?}");
    assert!(guests.is_empty(), "{guests:?}");

    Ok(())
}
