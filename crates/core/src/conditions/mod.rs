//! Query conditions
//!
//! The [`QueryConditionBuilder`] turns a [`RequestContext`] into a [`QueryPlan`]: an ordered set
//! of named tags plus the values that parametrise them. The plan is then expanded into a
//! [`PromoFilter`]: tags combine with AND, each tag's clauses combine with OR. Conditions that
//! compare stored fields are pushed into the repository; the rest are evaluated after retrieval.

use jiff::Timestamp;
use smallvec::{SmallVec, smallvec};

use crate::{
    context::{Audience, RequestContext},
    locale::{DEFAULT_COUNTRY, Locale},
    promos::{Promo, PromoType},
};

mod predicates;

pub use predicates::{Clause, Predicate};

/// Named predicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTag {
    /// Global usage budget has room.
    UsageLimit,

    /// Served in the requested country.
    Country,

    /// Administratively active.
    IsActive,

    /// Validity window contains now (closed interval).
    SimpleDateCheck,

    /// Checkout-class promo types.
    PromoCheckoutType,

    /// Served at the requested store.
    StoreId,

    /// Served to guests.
    EntitledUserGuest,

    /// Served to signed-in customers.
    EntitledUserExisting,

    /// Served to everyone.
    EntitledUserAll,

    /// User coupon promo type.
    UserCouponType,

    /// Coupon validity window contains now (end exclusive).
    CouponDateCheck,

    /// Coupon offered to guests.
    CouponGuest,

    /// Coupon offered to signed-in customers.
    CouponExisting,
}

/// Where a condition is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Pushed into the repository query.
    Stored,

    /// Evaluated on retrieved promos.
    PostHoc,
}

impl QueryTag {
    /// Tag name as logged.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryTag::UsageLimit => "usage_limit",
            QueryTag::Country => "country",
            QueryTag::IsActive => "is_active",
            QueryTag::SimpleDateCheck => "simple_date_check",
            QueryTag::PromoCheckoutType => "promo_checkout_type",
            QueryTag::StoreId => "store_id",
            QueryTag::EntitledUserGuest => "entitled_user_guest",
            QueryTag::EntitledUserExisting => "entitled_user_exiting",
            QueryTag::EntitledUserAll => "entitled_user_all",
            QueryTag::UserCouponType => "user_coupon_type",
            QueryTag::CouponDateCheck => "coupon_date_check",
            QueryTag::CouponGuest => "coupon_guest",
            QueryTag::CouponExisting => "coupon_existing",
        }
    }

    /// Evaluation stage.
    pub fn stage(self) -> Stage {
        match self {
            QueryTag::UsageLimit => Stage::PostHoc,
            _ => Stage::Stored,
        }
    }
}

/// Values referenced by tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionValues {
    /// Country to match.
    pub country: String,

    /// Active flag to match.
    pub is_active: bool,

    /// Evaluation instant.
    pub now: Timestamp,

    /// Store to match.
    pub store_id: Option<String>,
}

/// Ordered tags plus their value bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Tags, in build order.
    pub tags: SmallVec<[QueryTag; 8]>,

    /// Values the tags are parametrised with.
    pub values: ConditionValues,
}

/// One tag's OR'd clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Source tag.
    pub tag: QueryTag,

    /// Alternatives; at least one must hold.
    pub clauses: SmallVec<[Clause; 2]>,
}

impl Condition {
    /// Evaluate against a promo. A condition without clauses always holds.
    pub fn matches(&self, promo: &Promo) -> bool {
        self.clauses.is_empty()
            || self
                .clauses
                .iter()
                .any(|clause| clause.iter().all(|predicate| predicate.matches(promo)))
    }

    /// Evaluation stage.
    pub fn stage(&self) -> Stage {
        self.tag.stage()
    }
}

/// AND'd conditions, split by evaluation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoFilter {
    conditions: Vec<Condition>,
}

impl PromoFilter {
    /// All tags, in build order.
    pub fn tags(&self) -> impl Iterator<Item = QueryTag> + '_ {
        self.conditions.iter().map(|condition| condition.tag)
    }

    /// Conditions the repository evaluates.
    pub fn stored(&self) -> impl Iterator<Item = &Condition> {
        self.conditions
            .iter()
            .filter(|condition| condition.stage() == Stage::Stored)
    }

    /// Conditions evaluated after retrieval.
    pub fn post_hoc(&self) -> impl Iterator<Item = &Condition> {
        self.conditions
            .iter()
            .filter(|condition| condition.stage() == Stage::PostHoc)
    }

    /// Whether a promo passes every stored-field condition.
    pub fn matches_stored(&self, promo: &Promo) -> bool {
        self.stored().all(|condition| condition.matches(promo))
    }

    /// Whether a promo passes every post-retrieval condition.
    pub fn matches_post_hoc(&self, promo: &Promo) -> bool {
        self.post_hoc().all(|condition| condition.matches(promo))
    }

    /// Whether a promo passes every condition.
    pub fn matches(&self, promo: &Promo) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(promo))
    }

    /// Drop retrieved promos failing a post-retrieval condition, preserving order.
    pub fn retain_post_hoc(&self, promos: &mut Vec<Promo>) {
        promos.retain(|promo| self.matches_post_hoc(promo));
    }
}

impl QueryPlan {
    /// Expand tags into conditions.
    pub fn into_filter(self) -> PromoFilter {
        let conditions = self
            .tags
            .iter()
            .map(|tag| Condition {
                tag: *tag,
                clauses: clauses_for(*tag, &self.values),
            })
            .collect();

        PromoFilter { conditions }
    }
}

fn clauses_for(tag: QueryTag, values: &ConditionValues) -> SmallVec<[Clause; 2]> {
    match tag {
        QueryTag::UsageLimit => smallvec![smallvec![Predicate::UsageRemaining]],
        QueryTag::Country => smallvec![smallvec![Predicate::CountryEquals(values.country.clone())]],
        QueryTag::IsActive => smallvec![smallvec![Predicate::IsActive(values.is_active)]],
        QueryTag::SimpleDateCheck => smallvec![smallvec![
            Predicate::StartsAtOrBefore(values.now),
            Predicate::EndsAtOrAfter(values.now),
        ]],
        QueryTag::CouponDateCheck => smallvec![smallvec![
            Predicate::StartsAtOrBefore(values.now),
            Predicate::EndsAfter(values.now),
        ]],
        QueryTag::PromoCheckoutType => smallvec![smallvec![Predicate::PromoTypeIn(
            SmallVec::from_buf(PromoType::CHECKOUT)
        )]],
        QueryTag::UserCouponType => {
            smallvec![smallvec![Predicate::PromoTypeIn(smallvec![PromoType::UserCoupon])]]
        }
        QueryTag::StoreId => match &values.store_id {
            Some(store_id) => smallvec![
                smallvec![Predicate::AllStores],
                smallvec![Predicate::ListedStore(store_id.clone())],
            ],
            None => smallvec![smallvec![Predicate::AllStores]],
        },
        QueryTag::EntitledUserGuest => smallvec![
            smallvec![Predicate::AllUsers],
            smallvec![Predicate::GuestUsers],
        ],
        QueryTag::EntitledUserExisting => smallvec![
            smallvec![Predicate::AllUsers],
            smallvec![Predicate::ExistingUsers],
        ],
        QueryTag::EntitledUserAll => smallvec![smallvec![Predicate::AllUsers]],
        QueryTag::CouponGuest => smallvec![smallvec![Predicate::GuestUsers]],
        QueryTag::CouponExisting => smallvec![smallvec![Predicate::ExistingUsers]],
    }
}

/// Builds promo filters from request contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConditionBuilder {
    default_country: String,
}

impl Default for QueryConditionBuilder {
    fn default() -> Self {
        Self {
            default_country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl QueryConditionBuilder {
    /// Builder falling back to the locale's default country.
    pub fn new(locale: &Locale) -> Self {
        Self {
            default_country: locale.default_country().to_string(),
        }
    }

    /// Tags and values for a promo search.
    pub fn plan(&self, ctx: &RequestContext) -> QueryPlan {
        let mut tags: SmallVec<[QueryTag; 8]> = smallvec![
            QueryTag::UsageLimit,
            QueryTag::Country,
            QueryTag::IsActive,
            QueryTag::SimpleDateCheck,
        ];

        if ctx.shipping.is_some() {
            tags.push(QueryTag::PromoCheckoutType);
        }

        if ctx.store_id.is_some() {
            tags.push(QueryTag::StoreId);
        }

        tags.push(match ctx.audience {
            Audience::Guest => QueryTag::EntitledUserGuest,
            Audience::Existing => QueryTag::EntitledUserExisting,
            Audience::Any => QueryTag::EntitledUserAll,
        });

        QueryPlan {
            tags,
            values: ConditionValues {
                country: ctx
                    .country
                    .clone()
                    .unwrap_or_else(|| self.default_country.clone()),
                is_active: true,
                now: ctx.now,
                store_id: ctx.store_id.clone(),
            },
        }
    }

    /// Filter for a promo search.
    pub fn build(&self, ctx: &RequestContext) -> PromoFilter {
        self.plan(ctx).into_filter()
    }

    /// Filter for the user coupons offered to an audience at `now`.
    pub fn coupons(&self, is_guest: bool, now: Timestamp) -> PromoFilter {
        let audience = if is_guest {
            QueryTag::CouponGuest
        } else {
            QueryTag::CouponExisting
        };

        QueryPlan {
            tags: smallvec![
                QueryTag::IsActive,
                QueryTag::UserCouponType,
                QueryTag::CouponDateCheck,
                audience,
            ],
            values: ConditionValues {
                country: self.default_country.clone(),
                is_active: true,
                now,
                store_id: None,
            },
        }
        .into_filter()
    }
}
