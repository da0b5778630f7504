//! User coupons
//!
//! Merges the user coupons offered globally with the coupons a customer already holds.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    conditions::QueryConditionBuilder,
    context::CustomerId,
    promos::{Promo, PromoId, PromoType, UsageLimit},
    user_promos::UserPromo,
};

/// A coupon as listed to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Holder.
    pub customer_id: CustomerId,

    /// Promo key.
    pub promo_id: PromoId,

    /// Promo code.
    pub promo_code: String,

    /// Marketing name; stored rows do not carry one.
    #[serde(default)]
    pub name: String,

    /// Marketing description.
    #[serde(default)]
    pub description: String,

    /// Start of the validity window.
    #[serde(default)]
    pub start_date: Option<Timestamp>,

    /// End of the validity window.
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Serving order.
    pub priority: i64,

    /// Budget, for coupons without a per-customer count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<UsageLimit>,

    /// Remaining redemptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_count: Option<i64>,
}

impl Coupon {
    /// A coupon the customer already holds.
    pub fn held(row: &UserPromo) -> Self {
        Self {
            customer_id: row.customer_id.clone(),
            promo_id: row.promo_id.clone(),
            promo_code: row.promo_code.clone(),
            name: String::new(),
            description: row.description.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            priority: row.priority,
            usage_limit: Some(row.usage_limit),
            available_count: row.available_count,
        }
    }

    /// A global coupon offered to a customer who does not hold it yet.
    pub fn offered(customer_id: &CustomerId, promo: &Promo) -> Self {
        let cap = promo.usage_limit.per_user_cap();

        Self {
            customer_id: customer_id.clone(),
            promo_id: promo.promo_id.clone(),
            promo_code: promo.promo_code.clone(),
            name: promo.name.clone(),
            description: promo.description.clone(),
            start_date: promo.start_date,
            end_date: promo.end_date,
            priority: promo.priority,
            usage_limit: cap.is_none().then_some(promo.usage_limit),
            available_count: cap,
        }
    }
}

/// Whether a stored row is an active coupon for the audience.
pub fn is_listed_row(row: &UserPromo, is_guest: bool) -> bool {
    let audience = if is_guest {
        row.entitled_user.guest_user
    } else {
        row.entitled_user.existing_user
    };

    row.is_active && row.promo_type == PromoType::UserCoupon && audience
}

/// Merge offered globals with held rows.
///
/// Globals the customer already holds are not offered again and used-up rows are dropped. The
/// result is sorted by priority, held rows first on ties.
pub fn merge_coupons(
    customer_id: &CustomerId,
    global: &[Promo],
    rows: &[UserPromo],
) -> Vec<Coupon> {
    let mut coupons: Vec<Coupon> = rows
        .iter()
        .filter(|row| !row.is_exhausted())
        .map(Coupon::held)
        .collect();

    coupons.extend(
        global
            .iter()
            .filter(|promo| !rows.iter().any(|row| row.promo_id == promo.promo_id))
            .map(|promo| Coupon::offered(customer_id, promo)),
    );

    coupons.sort_by_key(|coupon| coupon.priority);

    coupons
}

/// List a customer's coupons from a snapshot.
///
/// Anonymous callers get nothing.
pub fn list_coupons(
    builder: &QueryConditionBuilder,
    customer_id: Option<&CustomerId>,
    is_guest: bool,
    now: Timestamp,
    candidates: &[Promo],
    rows: &[UserPromo],
) -> Vec<Coupon> {
    let Some(customer_id) = customer_id else {
        return Vec::new();
    };

    let filter = builder.coupons(is_guest, now);

    let mut global: Vec<Promo> = candidates
        .iter()
        .filter(|promo| filter.matches(promo))
        .cloned()
        .collect();

    global.sort_by_key(|promo| promo.priority);

    let rows: Vec<UserPromo> = rows
        .iter()
        .filter(|row| row.customer_id == *customer_id && is_listed_row(row, is_guest))
        .cloned()
        .collect();

    merge_coupons(customer_id, &global, &rows)
}

#[cfg(test)]
mod tests {
    use crate::{
        promos::UserEntitlement,
        test_support::{capped, customer, now, promo, user_promo},
    };

    use super::*;

    fn coupon(id: &str, priority: i64) -> Promo {
        Promo {
            promo_type: PromoType::UserCoupon,
            entitled_user: UserEntitlement {
                existing_user: true,
                ..UserEntitlement::default()
            },
            ..promo(id, priority)
        }
    }

    fn codes(coupons: &[Coupon]) -> Vec<&str> {
        coupons.iter().map(|c| c.promo_id.as_str()).collect()
    }

    #[test]
    fn held_globals_are_not_offered_again() {
        let a = capped(coupon("a", 1), 3);
        let b = capped(coupon("b", 2), 3);

        let coupons = merge_coupons(&customer(), &[a.clone(), b], &[user_promo(&a, Some(1))]);

        assert_eq!(codes(&coupons), vec!["a", "b"]);
        assert_eq!(
            coupons.iter().map(|c| c.available_count).collect::<Vec<_>>(),
            vec![Some(1), Some(3)]
        );
    }

    #[test]
    fn used_up_rows_are_dropped() {
        let a = capped(coupon("a", 1), 3);

        let coupons = merge_coupons(&customer(), &[a.clone()], &[user_promo(&a, Some(0))]);

        assert!(coupons.is_empty(), "{coupons:?}");
    }

    #[test]
    fn uncapped_offers_keep_their_budget() {
        let coupons = merge_coupons(&customer(), &[coupon("a", 1)], &[]);

        assert_eq!(coupons.first().and_then(|c| c.available_count), None);
        assert_eq!(
            coupons.first().and_then(|c| c.usage_limit),
            Some(UsageLimit::default())
        );
    }

    #[test]
    fn anonymous_callers_get_nothing() {
        let coupons = list_coupons(
            &QueryConditionBuilder::default(),
            None,
            false,
            now(),
            &[coupon("a", 1)],
            &[],
        );

        assert!(coupons.is_empty());
    }

    #[test]
    fn listing_filters_by_type_and_audience() {
        let guest_only = Promo {
            entitled_user: UserEntitlement {
                guest_user: true,
                ..UserEntitlement::default()
            },
            ..coupon("guest", 1)
        };

        let checkout = Promo {
            promo_type: PromoType::Checkout,
            ..coupon("checkout", 2)
        };

        let coupons = list_coupons(
            &QueryConditionBuilder::default(),
            Some(&customer()),
            false,
            now(),
            &[coupon("c", 3), guest_only, checkout],
            &[],
        );

        assert_eq!(codes(&coupons), vec!["c"]);
    }
}
