//! Eligibility
//!
//! Narrows a global candidate set to the promos a request context is entitled to, merges the
//! customer's personal promo state into it and prices shipping against the result. Everything
//! here operates on a snapshot; retrieval belongs to the caller.

use jiff::{SignedDuration, Timestamp};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    conditions::{PromoFilter, QueryConditionBuilder},
    context::RequestContext,
    hash::PromoHash,
    promos::{Promo, PromoId},
    shipping::DiscountApplier,
    user_promos::UserPromo,
};

mod removal;

pub use removal::{RemovalSets, common, exclusion_violated, expired_by_user};

const SECONDS_PER_DAY: i64 = 86_400;

/// A promo as served to one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPromo {
    /// Global definition.
    pub promo: Promo,

    /// Remaining redemptions for the customer.
    pub available_count: Option<i64>,

    /// Customer-specific expiry.
    pub user_end_date: Option<Timestamp>,

    /// The promo's own discounted delivery fee.
    pub promo_shipping: Option<Decimal>,
}

impl ResolvedPromo {
    /// Serve a global promo without user state.
    pub fn new(promo: Promo) -> Self {
        Self {
            promo,
            available_count: None,
            user_end_date: None,
            promo_shipping: None,
        }
    }

    /// Overlay the customer's row.
    pub fn with_user_state(mut self, row: &UserPromo) -> Self {
        self.available_count = row.available_count.filter(|count| *count != 0);

        if row.end_date.is_some() {
            self.user_end_date = row.end_date;
        }

        self
    }

    /// Expiry as shown to the customer.
    pub fn effective_end_date(&self) -> Option<Timestamp> {
        self.user_end_date.or(self.promo.end_date)
    }

    /// Response representation.
    pub fn summary(&self) -> PromoSummary {
        PromoSummary {
            promo_id: self.promo.promo_id.clone(),
            promo_code: self.promo.promo_code.clone(),
            name: self.promo.name.clone(),
            description: self.promo.description.clone(),
            start_date: self.promo.start_date,
            end_date: self.effective_end_date(),
            available_count: self.available_count,
        }
    }
}

/// Promo fields returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSummary {
    /// Promo key.
    pub promo_id: PromoId,

    /// Promo code.
    #[serde(default)]
    pub promo_code: String,

    /// Marketing name.
    #[serde(default)]
    pub name: String,

    /// Marketing description.
    #[serde(default)]
    pub description: String,

    /// Start of the validity window.
    #[serde(default)]
    pub start_date: Option<Timestamp>,

    /// Expiry, customer-specific when one applies.
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Remaining redemptions for the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_count: Option<i64>,
}

/// Resolved promos in serving order, plus the shipping quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Eligible promos, priority ascending.
    pub promos: Vec<ResolvedPromo>,

    /// Discounted delivery fee.
    pub promo_shipping: Option<Decimal>,

    /// Reference delivery fee.
    pub original_shipping: Option<Decimal>,

    /// Candidates dropped for exhausted or ended user rows and code exclusions.
    pub removed_count: usize,
}

impl Resolution {
    /// Response representations in serving order.
    pub fn summaries(&self) -> Vec<PromoSummary> {
        self.promos.iter().map(ResolvedPromo::summary).collect()
    }

    /// Whether no promo is eligible.
    pub fn is_empty(&self) -> bool {
        self.promos.is_empty()
    }
}

/// Subtract the removal sets from the globals, overlay user state and sort by priority.
///
/// Ties keep retrieval order.
pub fn merge(hash: &PromoHash, removals: &RemovalSets) -> Vec<ResolvedPromo> {
    let mut promos: Vec<ResolvedPromo> = hash
        .global
        .iter()
        .filter(|promo| !removals.is_removed(&promo.promo_id))
        .map(|promo| {
            let resolved = ResolvedPromo::new(promo.clone());

            match hash.user.get(&promo.promo_id) {
                Some(row) => resolved.with_user_state(row),
                None => resolved,
            }
        })
        .collect();

    promos.sort_by_key(|resolved| resolved.promo.priority);

    promos
}

/// Record a customer-specific expiry for promos with a rolling expiry rule.
///
/// A promo that already carries one keeps it; the candidate only applies when it falls before the
/// promo's own end date.
pub fn apply_rolling_expiry(promos: &mut [ResolvedPromo], now: Timestamp) {
    for resolved in promos.iter_mut() {
        if resolved.user_end_date.is_some() {
            continue;
        }

        let Some(end_date) = resolved.promo.end_date else {
            continue;
        };

        let candidate = resolved
            .promo
            .rolling_expiry_rule()
            .and_then(|rule| rule.value)
            .and_then(|days| rolling_end_date(now, days));

        if let Some(candidate) = candidate.filter(|candidate| *candidate < end_date) {
            resolved.user_end_date = Some(candidate);
        }
    }
}

fn rolling_end_date(now: Timestamp, days: Decimal) -> Option<Timestamp> {
    let seconds = days
        .checked_mul(Decimal::from(SECONDS_PER_DAY))?
        .trunc()
        .to_i64()?;

    now.checked_add(SignedDuration::from_secs(seconds)).ok()
}

/// Resolves promo snapshots for request contexts.
#[derive(Debug, Clone, Default)]
pub struct EligibilityResolver {
    builder: QueryConditionBuilder,
    applier: DiscountApplier,
}

impl EligibilityResolver {
    /// Resolver with the given condition builder and discount applier.
    pub fn new(builder: QueryConditionBuilder, applier: DiscountApplier) -> Self {
        Self { builder, applier }
    }

    /// Filter for retrieving global candidates.
    pub fn filter(&self, ctx: &RequestContext) -> PromoFilter {
        self.builder.build(ctx)
    }

    /// Condition builder in use.
    pub fn builder(&self) -> &QueryConditionBuilder {
        &self.builder
    }

    /// Resolve a snapshot.
    ///
    /// `candidates` may be a superset of the filter's matches; every condition is re-checked.
    /// `user_promos` are the customer's rows and are ignored when no global candidate survives.
    pub fn resolve_snapshot(
        &self,
        ctx: &RequestContext,
        candidates: Vec<Promo>,
        user_promos: Vec<UserPromo>,
    ) -> Resolution {
        let filter = self.filter(ctx);

        let mut global: Vec<Promo> = candidates
            .into_iter()
            .filter(|promo| filter.matches(promo))
            .collect();

        if global.is_empty() {
            return Resolution::default();
        }

        global.sort_by_key(|promo| promo.priority);

        let hash = PromoHash::build(global, user_promos);
        let removals = RemovalSets::compute(&hash, ctx.now);

        let mut promos = merge(&hash, &removals);

        apply_rolling_expiry(&mut promos, ctx.now);

        let mut resolution = Resolution {
            promos,
            removed_count: removals.removed_count(),
            ..Resolution::default()
        };

        if let Some(amount) = ctx.shipping {
            self.price_shipping(&mut resolution, amount, ctx.avoid_reference_price);
        }

        resolution
    }

    fn price_shipping(&self, resolution: &mut Resolution, amount: Decimal, skip_reference: bool) {
        let quote = self.applier.quote(
            resolution.promos.iter().map(|resolved| &resolved.promo),
            amount,
            skip_reference,
        );

        for (resolved, fee) in resolution.promos.iter_mut().zip(quote.per_promo) {
            resolved.promo_shipping = fee;
        }

        resolution.promo_shipping = quote.promo_shipping;
        resolution.original_shipping = quote.original_shipping;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        context::Audience,
        rules::{DiscountType, Rule, ValueType},
        test_support::{at, capped, customer, now, promo, shipping_promo, user_promo},
    };

    use super::*;

    fn context() -> RequestContext {
        RequestContext {
            audience: Audience::Existing,
            customer_id: Some(customer()),
            ..RequestContext::anonymous(now())
        }
    }

    fn ids(resolution: &Resolution) -> Vec<&str> {
        resolution
            .promos
            .iter()
            .map(|resolved| resolved.promo.promo_id.as_str())
            .collect()
    }

    #[test]
    fn free_delivery_leads_the_list() {
        let ctx = RequestContext {
            shipping: Some(dec!(3.99)),
            ..context()
        };

        let resolution = EligibilityResolver::default().resolve_snapshot(
            &ctx,
            vec![
                promo("b", 2),
                shipping_promo("a", 1, ValueType::ValueOverride, dec!(0)),
            ],
            Vec::new(),
        );

        assert_eq!(ids(&resolution), vec!["a", "b"]);
        assert_eq!(resolution.promo_shipping, Some(dec!(0)));
        assert_eq!(resolution.original_shipping, Some(dec!(3.99)));
    }

    #[test]
    fn equal_priorities_keep_retrieval_order() {
        let resolution = EligibilityResolver::default().resolve_snapshot(
            &context(),
            vec![promo("z", 1), promo("y", 1), promo("x", 0)],
            Vec::new(),
        );

        assert_eq!(ids(&resolution), vec!["x", "z", "y"]);
    }

    #[test]
    fn resolving_twice_gives_identical_output() {
        let a = capped(promo("a", 1), 3);
        let snapshot = (vec![a.clone(), promo("b", 2)], vec![user_promo(&a, Some(2))]);

        let resolver = EligibilityResolver::default();

        let first = resolver.resolve_snapshot(&context(), snapshot.0.clone(), snapshot.1.clone());
        let second = resolver.resolve_snapshot(&context(), snapshot.0, snapshot.1);

        assert_eq!(first, second);
    }

    #[test]
    fn user_state_overlays_the_global_definition() -> Result<(), jiff::Error> {
        let a = capped(promo("a", 1), 3);

        let mut row = user_promo(&a, Some(2));

        row.end_date = Some(at("2026-07-01T00:00:00Z")?);

        let resolution =
            EligibilityResolver::default().resolve_snapshot(&context(), vec![a.clone()], vec![row]);

        let summaries = resolution.summaries();

        assert_eq!(summaries.first().and_then(|s| s.available_count), Some(2));
        assert_eq!(
            summaries.first().and_then(|s| s.end_date),
            Some(at("2026-07-01T00:00:00Z")?)
        );
        assert_eq!(
            resolution.promos.first().and_then(|p| p.promo.end_date),
            a.end_date
        );

        Ok(())
    }

    #[test]
    fn exhausted_and_excluded_promos_are_dropped() {
        let used_up = capped(promo("used", 1), 1);
        let welcome = promo("welcome", 2);

        let loyalty = Promo {
            prerequisite_promo_code_not_permitted: vec!["WELCOME".to_string()],
            ..promo("loyalty", 3)
        };

        let resolution = EligibilityResolver::default().resolve_snapshot(
            &context(),
            vec![used_up.clone(), welcome.clone(), loyalty, promo("other", 4)],
            vec![user_promo(&used_up, Some(0)), user_promo(&welcome, Some(1))],
        );

        assert_eq!(ids(&resolution), vec!["welcome", "other"]);
        assert_eq!(resolution.removed_count, 2);
    }

    #[test]
    fn ineligible_candidates_are_filtered() {
        let inactive = Promo {
            is_active: false,
            ..promo("inactive", 1)
        };

        let canadian = Promo {
            country: "CA".to_string(),
            ..promo("canadian", 2)
        };

        let resolution = EligibilityResolver::default().resolve_snapshot(
            &context(),
            vec![inactive, canadian, promo("ok", 3)],
            Vec::new(),
        );

        assert_eq!(ids(&resolution), vec!["ok"]);
    }

    #[test]
    fn no_candidates_short_circuits() {
        let resolution = EligibilityResolver::default().resolve_snapshot(
            &RequestContext {
                shipping: Some(dec!(3.99)),
                ..context()
            },
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(resolution, Resolution::default());
    }

    #[test]
    fn rolling_expiry_shortens_the_visible_end_date() -> Result<(), jiff::Error> {
        let rolling = Promo {
            rules: vec![Rule::new(DiscountType::EndDate, ValueType::DaysToExpire, dec!(7))],
            ..promo("rolling", 1)
        };

        let resolution =
            EligibilityResolver::default().resolve_snapshot(&context(), vec![rolling], Vec::new());

        assert_eq!(
            resolution.promos.first().and_then(|p| p.user_end_date),
            Some(at("2026-06-25T12:00:00Z")?)
        );

        Ok(())
    }

    #[test]
    fn rolling_expiry_never_extends_the_end_date() -> Result<(), jiff::Error> {
        let mut rolling = Promo {
            rules: vec![Rule::new(DiscountType::EndDate, ValueType::DaysToExpire, dec!(30))],
            ..promo("rolling", 1)
        };

        rolling.end_date = Some(at("2026-06-20T00:00:00Z")?);

        let mut promos = vec![ResolvedPromo::new(rolling)];

        apply_rolling_expiry(&mut promos, now());

        assert_eq!(promos.first().and_then(|p| p.user_end_date), None);

        Ok(())
    }

    #[test]
    fn recorded_user_expiry_is_kept() -> Result<(), jiff::Error> {
        let rolling = Promo {
            rules: vec![Rule::new(DiscountType::EndDate, ValueType::DaysToExpire, dec!(7))],
            ..promo("rolling", 1)
        };

        let mut row = user_promo(&rolling, None);

        row.end_date = Some(at("2026-06-19T00:00:00Z")?);

        let resolution =
            EligibilityResolver::default().resolve_snapshot(&context(), vec![rolling], vec![row]);

        assert_eq!(
            resolution.promos.first().and_then(|p| p.user_end_date),
            Some(at("2026-06-19T00:00:00Z")?)
        );

        Ok(())
    }

    #[test]
    fn per_promo_shipping_is_recorded() {
        let ctx = RequestContext {
            shipping: Some(dec!(4)),
            ..context()
        };

        let resolution = EligibilityResolver::default().resolve_snapshot(
            &ctx,
            vec![
                shipping_promo("free", 1, ValueType::ValueOverride, dec!(0)),
                promo("plain", 2),
                shipping_promo("half", 3, ValueType::PercentageOff, dec!(50)),
            ],
            Vec::new(),
        );

        let fees: Vec<Option<Decimal>> = resolution.promos.iter().map(|p| p.promo_shipping).collect();

        assert_eq!(fees, vec![Some(dec!(0)), None, Some(dec!(2))]);
        assert_eq!(resolution.original_shipping, Some(dec!(2)));
    }
}
