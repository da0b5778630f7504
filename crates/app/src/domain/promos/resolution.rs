//! Promo resolution against the repository

use promo_engine::{
    conditions::QueryTag, context::RequestContext, eligibility::EligibilityResolver,
    eligibility::Resolution,
};
use smallvec::SmallVec;
use tracing::debug;

use super::{RepositoryError, repositories::PromoRepository};

/// Retrieve candidates and the customer's rows, then resolve the snapshot.
///
/// User rows are only fetched when a global candidate survives and the context names a customer.
pub(crate) async fn resolve(
    repository: &dyn PromoRepository,
    resolver: &EligibilityResolver,
    ctx: &RequestContext,
) -> Result<Resolution, RepositoryError> {
    let filter = resolver.filter(ctx);

    let tags: SmallVec<[&str; 8]> = filter.tags().map(QueryTag::as_str).collect();

    let mut candidates = repository.find_promos(&filter).await?;

    filter.retain_post_hoc(&mut candidates);

    debug!(
        tags = ?tags,
        candidate_count = candidates.len(),
        "retrieved promo candidates"
    );

    if candidates.is_empty() {
        return Ok(Resolution::default());
    }

    let user_promos = match &ctx.customer_id {
        Some(customer_id) => repository.find_user_promos(customer_id).await?,
        None => Vec::new(),
    };

    let user_promo_count = user_promos.len();

    let resolution = resolver.resolve_snapshot(ctx, candidates, user_promos);

    debug!(
        user_promo_count,
        resolved_count = resolution.promos.len(),
        removed_count = resolution.removed_count,
        "resolved promos"
    );

    Ok(resolution)
}
