//! Usage planning

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    context::CustomerId,
    eligibility::PromoSummary,
    ledger::UsageDirection,
    promos::{Promo, PromoId},
    user_promos::UserPromo,
};

/// Ledger invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A stored available count is outside `[0, max_per_user]`.
    #[error(
        "available count {available_count} for customer {customer_id} on promo {promo_id} is outside [0, {max_per_user}]"
    )]
    CounterOutOfBounds {
        /// Owning customer.
        customer_id: CustomerId,

        /// Affected promo.
        promo_id: PromoId,

        /// Stored count.
        available_count: i64,

        /// Parent per-customer cap.
        max_per_user: i64,
    },

    /// A planned consumption found the customer's count already at its floor when applied.
    #[error("customer {customer_id} has no redemptions left on promo {promo_id}")]
    RedemptionRejected {
        /// Owning customer.
        customer_id: CustomerId,

        /// Affected promo.
        promo_id: PromoId,
    },
}

/// One planned per-customer write.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPromoWrite {
    /// First tracked redemption: insert the row, or fill the count of a row that has none.
    Create {
        /// Row to store, count included.
        row: UserPromo,
    },

    /// Move an existing count by `delta`, only while the result stays within `[0, ceiling]`.
    Adjust {
        /// Denormalised fields plus the expected resulting count.
        row: UserPromo,

        /// Count delta.
        delta: i64,

        /// Upper bound of the count.
        ceiling: i64,
    },

    /// Untracked promo: store the denormalised fields only.
    Refresh {
        /// Row to store, without a count.
        row: UserPromo,
    },
}

impl UserPromoWrite {
    /// Row the write stores.
    pub fn row(&self) -> &UserPromo {
        match self {
            UserPromoWrite::Create { row }
            | UserPromoWrite::Adjust { row, .. }
            | UserPromoWrite::Refresh { row } => row,
        }
    }

    /// Write kind, as logged.
    pub fn kind(&self) -> &'static str {
        match self {
            UserPromoWrite::Create { .. } => "create",
            UserPromoWrite::Adjust { .. } => "adjust",
            UserPromoWrite::Refresh { .. } => "refresh",
        }
    }
}

/// Plan the per-customer write for one promo.
///
/// Returns `Ok(None)` when the counter is at its floor (consumption) or ceiling (credit-back), and
/// when crediting back a promo the customer never consumed.
///
/// # Errors
///
/// Returns [`LedgerError::CounterOutOfBounds`] when the stored count is outside
/// `[0, max_per_user]`.
pub fn plan_user_write(
    direction: UsageDirection,
    customer_id: &CustomerId,
    promo: &Promo,
    existing: Option<&UserPromo>,
) -> Result<Option<UserPromoWrite>, LedgerError> {
    let denormalised = UserPromo::from_promo(customer_id.clone(), promo);

    let Some(max_per_user) = promo.usage_limit.per_user_cap() else {
        return Ok(Some(UserPromoWrite::Refresh { row: denormalised }));
    };

    let current = existing.and_then(|row| row.available_count);

    let Some(count) = current else {
        return Ok(match direction {
            UsageDirection::Consume => Some(UserPromoWrite::Create {
                row: UserPromo {
                    available_count: Some(max_per_user - 1),
                    ..denormalised
                },
            }),
            UsageDirection::CreditBack => None,
        });
    };

    if !(0..=max_per_user).contains(&count) {
        return Err(LedgerError::CounterOutOfBounds {
            customer_id: customer_id.clone(),
            promo_id: promo.promo_id.clone(),
            available_count: count,
            max_per_user,
        });
    }

    let delta = direction.available_delta();
    let next = count + delta;

    if !(0..=max_per_user).contains(&next) {
        return Ok(None);
    }

    Ok(Some(UserPromoWrite::Adjust {
        row: UserPromo {
            available_count: Some(next),
            ..denormalised
        },
        delta,
        ceiling: max_per_user,
    }))
}

/// Stored state for one requested promo.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Promo as supplied by the caller.
    pub requested: PromoSummary,

    /// Current global definition; absent when removed administratively.
    pub promo: Option<Promo>,

    /// The customer's current row.
    pub existing: Option<UserPromo>,
}

/// Global counter movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalIncrement {
    /// Promo whose used count moves.
    pub promo_id: PromoId,

    /// Delta.
    pub delta: i64,
}

/// Every write one usage record performs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsagePlan {
    /// Global movement, once per call.
    pub global: Option<GlobalIncrement>,

    /// Per-customer writes in request order.
    pub writes: Vec<UserPromoWrite>,
}

impl UsagePlan {
    /// Whether nothing will be written.
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.writes.is_empty()
    }
}

/// Plan a usage record.
///
/// The global counter of the first promo that still exists moves once, and only when that promo's
/// per-customer write is planned: a consumption rejected at the floor leaves the promo untouched.
/// Every existing promo gets a per-customer write; rolling expiry promos carry the end date the
/// caller was shown. Repeated promo ids are recorded once.
///
/// # Errors
///
/// Returns the first [`LedgerError`] met; nothing should be written in that case.
pub fn plan_usage(
    direction: UsageDirection,
    customer_id: &CustomerId,
    entries: &[LedgerEntry],
) -> Result<UsagePlan, LedgerError> {
    let mut plan = UsagePlan::default();
    let mut seen = FxHashSet::default();

    for entry in entries {
        let Some(promo) = &entry.promo else {
            continue;
        };

        if !seen.insert(promo.promo_id.clone()) {
            continue;
        }

        let leading = seen.len() == 1;

        let promo = with_requested_end_date(promo, entry.requested.end_date);

        let Some(write) =
            plan_user_write(direction, customer_id, &promo, entry.existing.as_ref())?
        else {
            continue;
        };

        if leading {
            plan.global = Some(GlobalIncrement {
                promo_id: promo.promo_id.clone(),
                delta: direction.global_delta(),
            });
        }

        plan.writes.push(write);
    }

    Ok(plan)
}

fn with_requested_end_date(promo: &Promo, requested: Option<Timestamp>) -> Promo {
    let mut promo = promo.clone();

    if promo.rolling_expiry_rule().is_some() {
        promo.end_date = requested;
    }

    promo
}
