//! Discount Applier
//!
//! Prices the delivery fee against a resolved promo list. At most one promo discounts the fee
//! per quote; the pre-discount reference price is kept so the caller can render a "was/now"
//! comparison.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{promos::Promo, rules::apply_rule};

/// How the displayed reference price is chosen when several shipping promos stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePricePolicy {
    /// The undiscounted fee, replaced by the discounted fee of the first promo after the leading
    /// one whose own result is above zero.
    ///
    /// A promo whose shipping rules all leave the fee unchanged has no result of its own. It is
    /// passed over and the search continues; it never pins the reference to the undiscounted
    /// fee.
    #[default]
    NextStackedOffer,

    /// Always the undiscounted fee.
    Undiscounted,
}

impl ReferencePricePolicy {
    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            ReferencePricePolicy::NextStackedOffer => "next_stacked_offer",
            ReferencePricePolicy::Undiscounted => "undiscounted",
        }
    }
}

impl Display for ReferencePricePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Unknown reference price policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reference price policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for ReferencePricePolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next_stacked_offer" => Ok(ReferencePricePolicy::NextStackedOffer),
            "undiscounted" => Ok(ReferencePricePolicy::Undiscounted),
            _ => Err(UnknownPolicy(value.to_string())),
        }
    }
}

/// Outcome of pricing a delivery fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingQuote {
    /// Discounted fee, when a promo changed it.
    pub promo_shipping: Option<Decimal>,

    /// Reference fee to show next to the discounted one.
    pub original_shipping: Option<Decimal>,

    /// Each promo's own discounted fee, parallel to the input list. Only populated when the
    /// stacked reference price is calculated.
    pub per_promo: SmallVec<[Option<Decimal>; 4]>,
}

/// Applies shipping rules to a delivery fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscountApplier {
    policy: ReferencePricePolicy,
}

impl DiscountApplier {
    /// Applier using the given reference price policy.
    pub fn new(policy: ReferencePricePolicy) -> Self {
        Self { policy }
    }

    /// Configured policy.
    pub fn policy(&self) -> ReferencePricePolicy {
        self.policy
    }

    /// Quote a delivery fee against promos in serving order.
    ///
    /// Non-positive fees and empty promo lists produce an empty quote. With `skip_reference` set,
    /// only the applying promo's own reference is emitted.
    pub fn quote<'a>(
        &self,
        promos: impl IntoIterator<Item = &'a Promo>,
        amount: Decimal,
        skip_reference: bool,
    ) -> ShippingQuote {
        let promos: SmallVec<[&Promo; 4]> = promos.into_iter().collect();

        if amount <= Decimal::ZERO || promos.is_empty() {
            return ShippingQuote::default();
        }

        let mut quote = ShippingQuote::default();

        if let Some((promo, discounted)) = promos
            .iter()
            .find_map(|promo| discounted_shipping(promo, amount).map(|fee| (*promo, fee)))
        {
            quote.promo_shipping = Some(discounted);

            if promo.show_original_shipping {
                quote.original_shipping = Some(amount);
            }
        }

        if skip_reference {
            return quote;
        }

        quote.per_promo = promos
            .iter()
            .map(|promo| discounted_shipping(promo, amount))
            .collect();

        quote.original_shipping = Some(self.reference_price(&quote.per_promo, amount));

        quote
    }

    fn reference_price(&self, per_promo: &[Option<Decimal>], amount: Decimal) -> Decimal {
        match self.policy {
            ReferencePricePolicy::Undiscounted => amount,
            ReferencePricePolicy::NextStackedOffer => per_promo
                .iter()
                .skip(1)
                .flatten()
                .copied()
                .find(|fee| *fee > Decimal::ZERO)
                .unwrap_or(amount),
        }
    }
}

/// A promo's discounted fee: the result of its first shipping rule that changes the amount.
pub fn discounted_shipping(promo: &Promo, amount: Decimal) -> Option<Decimal> {
    promo
        .shipping_rules()
        .map(|rule| apply_rule(rule, amount))
        .find(|fee| *fee != amount)
}
