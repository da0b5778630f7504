//! Entitlement flags

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which audiences a promo is served to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "mirrors independent stored capability flags"
)]
pub struct UserEntitlement {
    /// Every audience.
    pub all: bool,

    /// Guest checkouts.
    pub guest_user: bool,

    /// Signed-in customers.
    pub existing_user: bool,

    /// Customers without a prior order.
    pub new_user: bool,

    /// Customers listed in `prerequisite_user_id`.
    pub user_id: bool,
}

/// Which stores a promo is served at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreEntitlement {
    /// Every store.
    pub all: bool,

    /// Stores listed in `prerequisite_store_id`.
    pub store_id: bool,
}

impl StoreEntitlement {
    /// Entitlement covering every store.
    pub const ALL: Self = Self {
        all: true,
        store_id: false,
    };
}

/// Which products a promo applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductEntitlement {
    /// Every product.
    pub all: bool,

    /// Products listed in `prerequisite_product_id`.
    pub product_id: bool,
}

impl ProductEntitlement {
    /// Entitlement covering every product.
    pub const ALL: Self = Self {
        all: true,
        product_id: false,
    };
}

/// Which store states a promo is served in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreStateEntitlement {
    /// Every state.
    pub all: bool,

    /// States listed in `prerequisite_store_state`.
    pub store_state: bool,
}

/// Cross-promo exclusion flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPromoEntitlement {
    /// Codes in `prerequisite_promo_code_not_permitted` exclude this promo.
    pub promo_code_not_permitted: bool,

    /// Codes in `prerequisite_promo_code_permitted` are required.
    pub promo_code_permitted: bool,
}

/// Order thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitleOrder {
    /// Minimum item quantity.
    pub min_quantity: i64,

    /// Minimum order total.
    pub min_total: Decimal,
}

impl Default for EntitleOrder {
    fn default() -> Self {
        Self {
            min_quantity: 0,
            min_total: Decimal::ZERO,
        }
    }
}
