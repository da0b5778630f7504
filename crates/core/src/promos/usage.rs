//! Usage limits

use serde::{Deserialize, Serialize};

/// Redemption budget of a promo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLimit {
    /// Global redemption cap; negative means unlimited.
    pub max: i64,

    /// Per-customer redemption cap; zero or negative means unlimited.
    pub max_per_user: i64,

    /// Global redemptions so far.
    pub used_count: i64,
}

impl Default for UsageLimit {
    fn default() -> Self {
        Self {
            max: -1,
            max_per_user: 0,
            used_count: 0,
        }
    }
}

impl UsageLimit {
    /// Whether the global budget still has room.
    pub fn has_remaining(&self) -> bool {
        self.max < 0 || self.used_count < self.max
    }

    /// The per-customer cap, when one is enforced.
    pub fn per_user_cap(&self) -> Option<i64> {
        (self.max_per_user > 0).then_some(self.max_per_user)
    }
}
