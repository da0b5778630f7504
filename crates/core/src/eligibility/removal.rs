//! Removal sets

use jiff::Timestamp;
use rustc_hash::FxHashSet;

use crate::{hash::PromoHash, promos::PromoId};

/// Promo ids computed independently from one snapshot, unioned before subtraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSets {
    /// Parents of user rows that are exhausted or past their end date.
    pub expired_by_user: FxHashSet<PromoId>,

    /// Globals excluded by a code the customer already holds.
    pub exclusion_violated: FxHashSet<PromoId>,

    /// Globals the customer also has a row for. Tracked, never removed.
    pub common: FxHashSet<PromoId>,
}

impl RemovalSets {
    /// Compute every set from the same snapshot.
    pub fn compute(hash: &PromoHash, now: Timestamp) -> Self {
        Self {
            expired_by_user: expired_by_user(hash, now),
            exclusion_violated: exclusion_violated(hash),
            common: common(hash),
        }
    }

    /// Whether a promo is dropped from the final list.
    pub fn is_removed(&self, promo_id: &PromoId) -> bool {
        self.expired_by_user.contains(promo_id) || self.exclusion_violated.contains(promo_id)
    }

    /// Number of distinct promos removed.
    pub fn removed_count(&self) -> usize {
        self.expired_by_user
            .union(&self.exclusion_violated)
            .count()
    }
}

/// User rows whose parent still exists, and which are exhausted or ended.
pub fn expired_by_user(hash: &PromoHash, now: Timestamp) -> FxHashSet<PromoId> {
    hash.user
        .iter()
        .filter_map(|row| {
            let parent = hash.global.get(&row.promo_id)?;

            (row.is_exhausted() || row.has_ended_at(now) || parent.has_ended_at(now))
                .then(|| row.promo_id.clone())
        })
        .collect()
}

/// Globals whose not-permitted codes intersect the codes the customer holds.
///
/// Customers without user rows hold no codes.
pub fn exclusion_violated(hash: &PromoHash) -> FxHashSet<PromoId> {
    if hash.user.is_empty() {
        return FxHashSet::default();
    }

    hash.global
        .iter()
        .filter(|promo| promo.excludes_any(|code| hash.user.contains_code(code)))
        .map(|promo| promo.promo_id.clone())
        .collect()
}

/// Globals present in both indexes.
pub fn common(hash: &PromoHash) -> FxHashSet<PromoId> {
    hash.global
        .iter()
        .filter(|promo| hash.user.contains(&promo.promo_id))
        .map(|promo| promo.promo_id.clone())
        .collect()
}
