//! Promos
//!
//! Global promotion documents. A [`Promo`] carries its eligibility predicates (entitlement flags
//! with their prerequisite lists), a usage budget and an ordered list of discount [`Rule`]s.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{ids::TypedId, rules::Rule};

mod entitlements;
mod usage;

pub use entitlements::{
    EntitleOrder, ProductEntitlement, StoreEntitlement, StoreStateEntitlement,
    UserEntitlement, UserPromoEntitlement,
};
pub use usage::UsageLimit;

/// Promo ID
pub type PromoId = TypedId<Promo>;

/// Promo Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    /// Applies to individual items.
    Item,

    /// Applies to the basket.
    Basket,

    /// Applies at checkout (delivery fee, order total).
    Checkout,

    /// Applies to a placed order.
    Order,

    /// A coupon materialised per customer.
    UserCoupon,
}

impl PromoType {
    /// Types served when a checkout (shipping) amount is being priced.
    pub const CHECKOUT: [PromoType; 2] = [PromoType::Checkout, PromoType::UserCoupon];

    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PromoType::Item => "item",
            PromoType::Basket => "basket",
            PromoType::Checkout => "checkout",
            PromoType::Order => "order",
            PromoType::UserCoupon => "user_coupon",
        }
    }
}

/// Promo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    /// Opaque unique key.
    pub promo_id: PromoId,

    /// Human-facing code; not unique across time.
    pub promo_code: String,

    /// Marketing name.
    pub name: String,

    /// Marketing description.
    pub description: String,

    /// Promo type.
    pub promo_type: PromoType,

    /// Country the promo is served in.
    pub country: String,

    /// Administrative on/off switch.
    pub is_active: bool,

    /// Serving order; lower sorts first.
    pub priority: i64,

    /// Start of the validity window.
    #[serde(default)]
    pub start_date: Option<Timestamp>,

    /// End of the validity window.
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Order thresholds.
    #[serde(default)]
    pub entitle_order: EntitleOrder,

    /// Product entitlement flags.
    #[serde(default)]
    pub entitled_product: ProductEntitlement,

    /// Products the promo is restricted to.
    #[serde(default)]
    pub prerequisite_product_id: Vec<String>,

    /// Redemption budget.
    #[serde(default)]
    pub usage_limit: UsageLimit,

    /// User entitlement flags.
    #[serde(default)]
    pub entitled_user: UserEntitlement,

    /// Customers the promo is restricted to.
    #[serde(default)]
    pub prerequisite_user_id: Vec<String>,

    /// Store entitlement flags.
    #[serde(default)]
    pub entitled_store: StoreEntitlement,

    /// Stores the promo is restricted to.
    #[serde(default)]
    pub prerequisite_store_id: Vec<String>,

    /// Store state entitlement flags.
    #[serde(default)]
    pub entitled_store_state: StoreStateEntitlement,

    /// States the promo is restricted to.
    #[serde(default)]
    pub prerequisite_store_state: Vec<String>,

    /// Cross-promo exclusion flags.
    #[serde(default)]
    pub entitle_user_promo: UserPromoEntitlement,

    /// Codes that, once held by a customer, exclude this promo.
    #[serde(default)]
    pub prerequisite_promo_code_not_permitted: Vec<String>,

    /// Codes a customer must hold for this promo.
    #[serde(default)]
    pub prerequisite_promo_code_permitted: Vec<String>,

    /// Ordered discount rules.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Whether a discounted shipping price is shown next to the undiscounted one.
    #[serde(default = "show_original_shipping_default")]
    pub show_original_shipping: bool,
}

fn show_original_shipping_default() -> bool {
    true
}

impl Promo {
    /// Whether `now` is past the promo's end date.
    pub fn has_ended_at(&self, now: Timestamp) -> bool {
        self.end_date.is_some_and(|end| now > end)
    }

    /// Rules that price the delivery fee, in order.
    pub fn shipping_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.is_shipping())
    }

    /// The first rolling expiry rule, if any.
    pub fn rolling_expiry_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.is_rolling_expiry())
    }

    /// Whether the promo excludes customers holding any of the given codes.
    pub fn excludes_any(&self, held_codes: impl Fn(&str) -> bool) -> bool {
        !self.prerequisite_promo_code_not_permitted.is_empty()
            && self
                .prerequisite_promo_code_not_permitted
                .iter()
                .any(|code| held_codes(code))
    }
}
