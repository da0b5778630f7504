//! Engine Config

use clap::Args;
use promo_engine::{
    locale::{DEFAULT_COUNTRY, Locale},
    shipping::ReferencePricePolicy,
};
use promo_engine_app::settings::EngineSettings;

/// Promotion engine settings.
#[derive(Debug, Args)]
pub struct EngineConfig {
    /// Displayed reference price when shipping promos stack (`next_stacked_offer`, `undiscounted`)
    #[arg(
        long,
        env = "PROMO_REFERENCE_PRICE_POLICY",
        default_value_t = ReferencePricePolicy::NextStackedOffer
    )]
    pub reference_price_policy: ReferencePricePolicy,

    /// Order channels usage is recorded for
    #[arg(
        long,
        env = "PROMO_USAGE_CHANNELS",
        value_delimiter = ',',
        default_value = "delivery"
    )]
    pub usage_channels: Vec<String>,

    /// Delivery is free for everyone; usage recording is skipped
    #[arg(long, env = "PROMO_DELIVERY_FEE_WAIVER", default_value_t = false)]
    pub delivery_fee_waiver: bool,

    /// Delivery is free for guests; usage recording is skipped
    #[arg(long, env = "PROMO_GUEST_DELIVERY_FEE_WAIVER", default_value_t = false)]
    pub guest_delivery_fee_waiver: bool,

    /// Country used when a request names no supported one
    #[arg(long, env = "PROMO_DEFAULT_COUNTRY", default_value = DEFAULT_COUNTRY)]
    pub default_country: String,

    /// Countries promos are served in
    #[arg(
        long,
        env = "PROMO_SUPPORTED_COUNTRIES",
        value_delimiter = ',',
        default_value = "US,CA"
    )]
    pub supported_countries: Vec<String>,
}

impl EngineConfig {
    /// Application-layer settings.
    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            reference_price_policy: self.reference_price_policy,
            usage_channels: self.usage_channels.clone(),
            delivery_fee_waiver: self.delivery_fee_waiver,
            guest_delivery_fee_waiver: self.guest_delivery_fee_waiver,
            locale: Locale::new(
                self.default_country.clone(),
                self.supported_countries.iter().cloned(),
            ),
        }
    }
}
