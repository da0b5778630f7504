//! Usage ledger
//!
//! Request types for recording promo consumption and credit-back, and the planner that turns a
//! request into global and per-customer counter writes. Every write is planned before any is
//! applied so that an out-of-bounds counter aborts the whole call.

use serde::{Deserialize, Serialize};

use crate::{
    context::{CustomerId, SearchRequest},
    eligibility::PromoSummary,
};

mod plan;

pub use plan::{
    GlobalIncrement, LedgerEntry, LedgerError, UsagePlan, UserPromoWrite, plan_usage,
    plan_user_write,
};

/// Channel usage is recorded for unless configured otherwise.
pub const DELIVERY_CHANNEL: &str = "delivery";

/// Counter movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageDirection {
    /// A promo was redeemed.
    Consume,

    /// A redemption was returned.
    CreditBack,
}

impl UsageDirection {
    /// Delta applied to the global used count.
    pub fn global_delta(self) -> i64 {
        match self {
            UsageDirection::Consume => 1,
            UsageDirection::CreditBack => -1,
        }
    }

    /// Delta applied to a customer's available count.
    pub fn available_delta(self) -> i64 {
        -self.global_delta()
    }
}

/// Wire form of the direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageAction {
    /// Consume.
    #[default]
    #[serde(rename = "block")]
    Block,

    /// Credit back.
    #[serde(rename = "credit back")]
    CreditBack,
}

impl From<UsageAction> for UsageDirection {
    fn from(action: UsageAction) -> Self {
        match action {
            UsageAction::Block => UsageDirection::Consume,
            UsageAction::CreditBack => UsageDirection::CreditBack,
        }
    }
}

/// Promos a usage record applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoDetails {
    /// Promos as previously resolved, in serving order.
    #[serde(default)]
    pub promos: Vec<PromoSummary>,
}

/// Usage recording request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRequest {
    /// Identity and search fields, used to resolve promos when none are supplied.
    #[serde(flatten)]
    pub search: SearchRequest,

    /// Promos to record against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_details: Option<PromoDetails>,

    /// Order channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,

    /// Direction; consumption when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<UsageAction>,
}

impl UsageRequest {
    /// Customer the usage is recorded for, taken from the stored profile.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.search
            .user_profile
            .as_ref()
            .and_then(|profile| profile.customer_id.as_ref())
    }

    /// Counter direction.
    pub fn direction(&self) -> UsageDirection {
        self.action.unwrap_or_default().into()
    }

    /// Supplied promos, when any.
    pub fn supplied_promos(&self) -> Option<&[PromoSummary]> {
        self.promo_details
            .as_ref()
            .map(|details| details.promos.as_slice())
    }

    /// Whether the order channel is one of `channels`.
    pub fn is_channel(&self, channels: &[String]) -> bool {
        self.order_type
            .as_deref()
            .is_some_and(|order_type| channels.iter().any(|channel| channel == order_type))
    }
}
