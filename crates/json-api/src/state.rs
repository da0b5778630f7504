//! State

use std::sync::Arc;

use promo_engine::locale::Locale;
use promo_engine_app::{context::AppContext, domain::promos::PromotionsService};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) promotions: Arc<dyn PromotionsService>,
    pub(crate) locale: Locale,
}

impl State {
    #[must_use]
    pub(crate) fn new(promotions: Arc<dyn PromotionsService>, locale: Locale) -> Self {
        Self { promotions, locale }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, locale: Locale) -> Arc<Self> {
        Arc::new(Self::new(app.promotions, locale))
    }
}
