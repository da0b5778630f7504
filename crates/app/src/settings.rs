//! Engine settings

use promo_engine::{
    conditions::QueryConditionBuilder, eligibility::EligibilityResolver, ledger::DELIVERY_CHANNEL,
    locale::Locale, shipping::DiscountApplier, shipping::ReferencePricePolicy,
};

/// Behaviour switches for the promotions service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// How the displayed pre-discount shipping is chosen when several promos price shipping.
    pub reference_price_policy: ReferencePricePolicy,

    /// Order channels usage is recorded for.
    pub usage_channels: Vec<String>,

    /// Delivery is free for everyone; usage recording is skipped.
    pub delivery_fee_waiver: bool,

    /// Delivery is free for guests; usage recording is skipped.
    pub guest_delivery_fee_waiver: bool,

    /// Country defaults and the supported set.
    pub locale: Locale,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reference_price_policy: ReferencePricePolicy::default(),
            usage_channels: vec![DELIVERY_CHANNEL.to_string()],
            delivery_fee_waiver: false,
            guest_delivery_fee_waiver: false,
            locale: Locale::default(),
        }
    }
}

impl EngineSettings {
    /// Whether a fee waiver disables usage recording.
    pub fn waives_delivery_fee(&self) -> bool {
        self.delivery_fee_waiver || self.guest_delivery_fee_waiver
    }

    /// Resolver configured from these settings.
    #[must_use]
    pub fn resolver(&self) -> EligibilityResolver {
        EligibilityResolver::new(
            QueryConditionBuilder::new(&self.locale),
            DiscountApplier::new(self.reference_price_policy),
        )
    }
}
