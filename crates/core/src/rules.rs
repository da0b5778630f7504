//! Discount rules
//!
//! A [`Rule`] is a single `{discount_type, value_type, value}` triple attached to a promo.
//! [`apply_rule`] is the rule evaluator: a pure, total function over monetary amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a rule discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// A single item line.
    ItemSingle,

    /// Time-of-day pricing.
    TimeOfDay,

    /// A combination of items.
    ItemCombo,

    /// The delivery fee.
    Shipping,

    /// Pick-up orders.
    PickUp,

    /// The current basket total.
    CurrentBasket,

    /// The promo's own expiry (rolling expiry rules).
    EndDate,

    /// Any value this engine does not recognise.
    #[serde(other)]
    Unknown,
}

/// How a rule's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Subtract a fixed amount.
    ValueOff,

    /// Subtract a percentage of the amount.
    PercentageOff,

    /// Replace the amount outright.
    ValueOverride,

    /// Number of days until the promo expires for a customer.
    DaysToExpire,

    /// Any value this engine does not recognise.
    #[serde(other)]
    Unknown,
}

/// How a rule spreads over multiple lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Applied to each line.
    Each,

    /// Spread across all lines.
    Across,
}

/// Discount Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// What the rule discounts.
    pub discount_type: DiscountType,

    /// How `value` is interpreted.
    pub value_type: ValueType,

    /// Rule magnitude; rules without one never change an amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,

    /// Allocation across lines.
    #[serde(default)]
    pub allocation_method: Option<AllocationMethod>,
}

impl Rule {
    /// Build a rule with a value and no allocation method.
    pub fn new(discount_type: DiscountType, value_type: ValueType, value: Decimal) -> Self {
        Self {
            discount_type,
            value_type,
            value: Some(value),
            allocation_method: None,
        }
    }

    /// Whether this rule prices the delivery fee.
    pub fn is_shipping(&self) -> bool {
        self.discount_type == DiscountType::Shipping
    }

    /// Whether this rule shortens the promo's expiry relative to now.
    pub fn is_rolling_expiry(&self) -> bool {
        self.discount_type == DiscountType::EndDate && self.value_type == ValueType::DaysToExpire
    }
}

/// Apply a single rule to an amount.
///
/// Values outside a value type's guard, unknown value types and arithmetic overflow all leave the
/// amount unchanged. No rounding is performed.
pub fn apply_rule(rule: &Rule, amount: Decimal) -> Decimal {
    let Some(value) = rule.value else {
        return amount;
    };

    if amount.is_zero() {
        return amount;
    }

    let discounted = match rule.value_type {
        ValueType::ValueOff if value > Decimal::ZERO => amount
            .checked_sub(value)
            .map(|result| result.max(Decimal::ZERO)),
        ValueType::PercentageOff if value > Decimal::ZERO && value <= Decimal::ONE_HUNDRED => amount
            .checked_mul(value)
            .and_then(|off| off.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|off| amount.checked_sub(off)),
        ValueType::ValueOverride if value >= Decimal::ZERO && value < amount => Some(value),
        _ => None,
    };

    discounted.unwrap_or(amount)
}
