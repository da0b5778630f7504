//! Promotions Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use promo_engine::{
    context::{CustomerId, SearchRequest},
    coupons::{Coupon, list_coupons},
    eligibility::{EligibilityResolver, Resolution},
    ledger::UsageRequest,
    promos::Promo,
    user_promos::UserPromo,
    validation::PromoDraft,
};
use tracing::{Span, info, warn};

use crate::{
    database::{Db, RepositoryConfig},
    domain::{
        orders::{OrderCredit, OrdersRepository, PgOrdersRepository},
        promos::{
            PromotionsServiceError, RepositoryError,
            repositories::{PgPromoRepository, PromoRepository},
            resolution::resolve,
            usage::record_usage,
        },
    },
    settings::EngineSettings,
};

#[derive(Clone)]
pub struct PromoEngine {
    promos: Arc<dyn PromoRepository>,
    orders: Arc<dyn OrdersRepository>,
    settings: EngineSettings,
    resolver: EligibilityResolver,
}

impl PromoEngine {
    #[must_use]
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        orders: Arc<dyn OrdersRepository>,
        settings: EngineSettings,
    ) -> Self {
        let resolver = settings.resolver();

        Self {
            promos,
            orders,
            settings,
            resolver,
        }
    }

    /// Engine backed by `PostgreSQL` documents.
    #[must_use]
    pub fn postgres(db: Db, config: RepositoryConfig, settings: EngineSettings) -> Self {
        Self::new(
            Arc::new(PgPromoRepository::new(db.clone(), config)),
            Arc::new(PgOrdersRepository::new(db, config)),
            settings,
        )
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

#[async_trait]
impl PromotionsService for PromoEngine {
    #[tracing::instrument(
        name = "promotions.service.search_promos",
        skip(self, request),
        fields(
            customer_id = tracing::field::Empty,
            promo_count = tracing::field::Empty
        )
    )]
    async fn search_promos(&self, request: &SearchRequest) -> Resolution {
        let ctx = request.to_context(Timestamp::now());

        let span = Span::current();

        if let Some(customer_id) = &ctx.customer_id {
            span.record("customer_id", tracing::field::display(customer_id));
        }

        let resolution = match resolve(self.promos.as_ref(), &self.resolver, &ctx).await {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(error = %error, "promo resolution failed; serving no promotions");

                Resolution::default()
            }
        };

        span.record("promo_count", resolution.promos.len());

        resolution
    }

    #[tracing::instrument(
        name = "promotions.service.record_usage",
        skip(self, request),
        fields(
            customer_id = tracing::field::Empty,
            direction = ?request.direction()
        ),
        err
    )]
    async fn record_usage(
        &self,
        request: &UsageRequest,
    ) -> Result<Vec<UserPromo>, PromotionsServiceError> {
        if let Some(customer_id) = request.customer_id() {
            Span::current().record("customer_id", tracing::field::display(customer_id));
        }

        record_usage(
            self.promos.as_ref(),
            &self.resolver,
            &self.settings,
            request,
            Timestamp::now(),
        )
        .await
    }

    #[tracing::instrument(
        name = "promotions.service.upsert_promo",
        skip(self, draft),
        fields(promo_id = tracing::field::Empty),
        err
    )]
    async fn upsert_promo(&self, draft: PromoDraft) -> Result<Promo, PromotionsServiceError> {
        let promo = draft.validate(&self.settings.locale)?;

        Span::current().record("promo_id", tracing::field::display(&promo.promo_id));

        let stored = self.promos.upsert_promo(promo).await?;

        info!(promo_id = %stored.promo_id, "upserted promo");

        Ok(stored)
    }

    #[tracing::instrument(
        name = "promotions.service.list_coupons",
        skip(self, customer_id),
        fields(customer_id = tracing::field::Empty)
    )]
    async fn list_coupons(
        &self,
        customer_id: Option<CustomerId>,
        is_guest: bool,
        now: Timestamp,
    ) -> Vec<Coupon> {
        let Some(customer_id) = customer_id else {
            return Vec::new();
        };

        Span::current().record("customer_id", tracing::field::display(&customer_id));

        let builder = self.resolver.builder();
        let filter = builder.coupons(is_guest, now);

        let snapshot = async {
            let global = self.promos.find_promos(&filter).await?;
            let rows = self.promos.find_user_promos(&customer_id).await?;

            Ok::<_, RepositoryError>((global, rows))
        };

        match snapshot.await {
            Ok((global, rows)) => {
                list_coupons(builder, Some(&customer_id), is_guest, now, &global, &rows)
            }
            Err(error) => {
                warn!(error = %error, "coupon listing failed; serving no coupons");

                Vec::new()
            }
        }
    }

    #[tracing::instrument(
        name = "promotions.service.credit_cancelled_order",
        skip(self),
        fields(promo_code = tracing::field::Empty),
        err
    )]
    async fn credit_cancelled_order(
        &self,
        order_id: &str,
    ) -> Result<OrderCredit, PromotionsServiceError> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| PromotionsServiceError::OrderNotFound(order_id.to_string()))?;

        let (Some(customer_id), Some(promo_code)) = (order.customer_id(), order.first_promo_code())
        else {
            return Err(PromotionsServiceError::OrderNotFound(order_id.to_string()));
        };

        Span::current().record("promo_code", promo_code);

        let not_applied = || OrderCredit::NotApplied {
            promo_code: promo_code.to_string(),
        };

        let Some(row) = self
            .promos
            .find_user_promo_by_code(customer_id, promo_code)
            .await?
        else {
            return Ok(not_applied());
        };

        let ceiling = row.usage_limit.max_per_user;

        match self.promos.adjust_user_promo(row, 1, ceiling).await? {
            Some(row) => {
                info!(promo_id = %row.promo_id, "credited cancelled order");

                Ok(OrderCredit::Credited(row))
            }
            None => Ok(not_applied()),
        }
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Resolve the promos a request is entitled to; failures degrade to an empty resolution.
    async fn search_promos(&self, request: &SearchRequest) -> Resolution;

    async fn record_usage(
        &self,
        request: &UsageRequest,
    ) -> Result<Vec<UserPromo>, PromotionsServiceError>;

    async fn upsert_promo(&self, draft: PromoDraft) -> Result<Promo, PromotionsServiceError>;

    /// A customer's coupons; failures degrade to an empty list.
    async fn list_coupons(
        &self,
        customer_id: Option<CustomerId>,
        is_guest: bool,
        now: Timestamp,
    ) -> Vec<Coupon>;

    async fn credit_cancelled_order(
        &self,
        order_id: &str,
    ) -> Result<OrderCredit, PromotionsServiceError>;
}
