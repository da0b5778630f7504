//! Usage recording
//!
//! Loads stored state for the requested promos, plans every write and only then applies them.

use jiff::Timestamp;
use promo_engine::{
    context::CustomerId,
    eligibility::{EligibilityResolver, PromoSummary},
    ledger::{
        LedgerEntry, LedgerError, UsageDirection, UsagePlan, UsageRequest, UserPromoWrite,
        plan_usage,
    },
    user_promos::UserPromo,
};
use tracing::{debug, error, info, warn};

use super::{
    PromotionsServiceError, RepositoryError, repositories::PromoRepository, resolution::resolve,
};
use crate::settings::EngineSettings;

pub(crate) async fn record_usage(
    repository: &dyn PromoRepository,
    resolver: &EligibilityResolver,
    settings: &EngineSettings,
    request: &UsageRequest,
    clock: Timestamp,
) -> Result<Vec<UserPromo>, PromotionsServiceError> {
    if settings.waives_delivery_fee() {
        return Ok(Vec::new());
    }

    if !request.is_channel(&settings.usage_channels) {
        return Ok(Vec::new());
    }

    let Some(customer_id) = request.customer_id() else {
        warn!("usage request without a customer; nothing recorded");

        return Ok(Vec::new());
    };

    let requested: Vec<PromoSummary> = match request.supplied_promos() {
        Some(promos) => promos.to_vec(),
        None => resolve(repository, resolver, &request.search.to_context(clock))
            .await?
            .summaries(),
    };

    let entries = load_entries(repository, customer_id, requested).await?;

    let direction = request.direction();

    let plan = plan_usage(direction, customer_id, &entries).inspect_err(|violation| {
        error!(error = %violation, "usage ledger invariant violated; nothing written");
    })?;

    apply_plan(repository, direction, plan).await
}

async fn load_entries(
    repository: &dyn PromoRepository,
    customer_id: &CustomerId,
    requested: Vec<PromoSummary>,
) -> Result<Vec<LedgerEntry>, RepositoryError> {
    let mut entries = Vec::with_capacity(requested.len());

    for summary in requested {
        let promo = repository.find_promo(&summary.promo_id).await?;

        let existing = match &promo {
            Some(_) => {
                repository
                    .find_user_promo(customer_id, &summary.promo_id)
                    .await?
            }
            None => None,
        };

        entries.push(LedgerEntry {
            requested: summary,
            promo,
            existing,
        });
    }

    Ok(entries)
}

/// Apply a plan in request order.
///
/// The global counter moves only once its promo's per-customer write has landed. A consumption
/// whose guard fails when applied is an error; a credit already at its ceiling is skipped.
async fn apply_plan(
    repository: &dyn PromoRepository,
    direction: UsageDirection,
    plan: UsagePlan,
) -> Result<Vec<UserPromo>, PromotionsServiceError> {
    let mut global = plan.global;
    let mut updated = Vec::with_capacity(plan.writes.len());

    for write in plan.writes {
        let kind = write.kind();
        let promo_id = write.row().promo_id.clone();

        let Some(row) = apply_write(repository, write).await? else {
            warn!(
                promo_id = %promo_id,
                kind,
                "user promo reached its limit concurrently; write skipped"
            );

            continue;
        };

        if let Some(increment) = global.take_if(|increment| increment.promo_id == row.promo_id) {
            let moved = repository
                .increment_used_count(&increment.promo_id, increment.delta)
                .await?;

            if moved.is_none() {
                warn!(promo_id = %increment.promo_id, "promo removed before its usage was counted");
            }
        }

        updated.push(row);
    }

    info!(
        direction = ?direction,
        write_count = updated.len(),
        "recorded promo usage"
    );

    Ok(updated)
}

async fn apply_write(
    repository: &dyn PromoRepository,
    write: UserPromoWrite,
) -> Result<Option<UserPromo>, PromotionsServiceError> {
    match write {
        UserPromoWrite::Create { row } => {
            if let Some(stored) = repository.create_user_promo(row.clone()).await? {
                return Ok(Some(stored));
            }

            debug!(
                promo_id = %row.promo_id,
                "user promo counted concurrently; decrementing the stored count"
            );

            let ceiling = row.usage_limit.per_user_cap().unwrap_or_default();

            consume(repository, row, -1, ceiling).await.map(Some)
        }
        UserPromoWrite::Adjust {
            row,
            delta,
            ceiling,
        } if delta < 0 => consume(repository, row, delta, ceiling).await.map(Some),
        UserPromoWrite::Adjust {
            row,
            delta,
            ceiling,
        } => Ok(repository.adjust_user_promo(row, delta, ceiling).await?),
        UserPromoWrite::Refresh { row } => Ok(Some(repository.refresh_user_promo(row).await?)),
    }
}

async fn consume(
    repository: &dyn PromoRepository,
    row: UserPromo,
    delta: i64,
    ceiling: i64,
) -> Result<UserPromo, PromotionsServiceError> {
    let customer_id = row.customer_id.clone();
    let promo_id = row.promo_id.clone();

    repository
        .adjust_user_promo(row, delta, ceiling)
        .await?
        .ok_or_else(|| {
            error!(
                customer_id = %customer_id,
                promo_id = %promo_id,
                "redemption rejected at the per-customer floor"
            );

            LedgerError::RedemptionRejected {
                customer_id,
                promo_id,
            }
            .into()
        })
}
