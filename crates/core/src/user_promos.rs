//! User Promos
//!
//! Per-customer materialised promo state. A row carries a denormalised copy of the parent promo's
//! serving fields plus the customer's remaining redemption count.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    context::CustomerId,
    promos::{Promo, PromoId, PromoType, UsageLimit, UserEntitlement},
};

/// User Promo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPromo {
    /// Owning customer.
    pub customer_id: CustomerId,

    /// Parent promo.
    pub promo_id: PromoId,

    /// Parent promo code.
    pub promo_code: String,

    /// Parent description.
    #[serde(default)]
    pub description: String,

    /// Parent start date.
    #[serde(default)]
    pub start_date: Option<Timestamp>,

    /// Customer-specific end date.
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Parent priority.
    #[serde(default)]
    pub priority: i64,

    /// Parent usage limit at the time of the last write.
    #[serde(default)]
    pub usage_limit: UsageLimit,

    /// Parent active flag.
    #[serde(default)]
    pub is_active: bool,

    /// Parent promo type.
    pub promo_type: PromoType,

    /// Parent audience flags.
    #[serde(default)]
    pub entitled_user: UserEntitlement,

    /// Remaining redemptions; only tracked when the parent caps per-customer usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_count: Option<i64>,
}

impl UserPromo {
    /// Denormalise a promo for a customer, without a redemption count.
    pub fn from_promo(customer_id: CustomerId, promo: &Promo) -> Self {
        Self {
            customer_id,
            promo_id: promo.promo_id.clone(),
            promo_code: promo.promo_code.clone(),
            description: promo.description.clone(),
            start_date: promo.start_date,
            end_date: promo.end_date,
            priority: promo.priority,
            usage_limit: promo.usage_limit,
            is_active: promo.is_active,
            promo_type: promo.promo_type,
            entitled_user: promo.entitled_user,
            available_count: None,
        }
    }

    /// Whether the customer has used up every redemption.
    pub fn is_exhausted(&self) -> bool {
        self.available_count.is_some_and(|count| count <= 0)
    }

    /// Whether `now` is past the customer's end date.
    pub fn has_ended_at(&self, now: Timestamp) -> bool {
        self.end_date.is_some_and(|end| now > end)
    }
}
