//! Match predicates

use jiff::Timestamp;
use smallvec::SmallVec;

use crate::promos::{Promo, PromoType};

/// A single comparison against a promo document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `country` equals the value.
    CountryEquals(String),

    /// `is_active` equals the value.
    IsActive(bool),

    /// `start_date <= value`.
    StartsAtOrBefore(Timestamp),

    /// `end_date >= value`.
    EndsAtOrAfter(Timestamp),

    /// `end_date > value`.
    EndsAfter(Timestamp),

    /// `promo_type` is one of the values.
    PromoTypeIn(SmallVec<[PromoType; 2]>),

    /// `entitled_store.all` is set.
    AllStores,

    /// `entitled_store.store_id` is set and the store is listed in `prerequisite_store_id`.
    ListedStore(String),

    /// `entitled_user.all` is set.
    AllUsers,

    /// `entitled_user.guest_user` is set.
    GuestUsers,

    /// `entitled_user.existing_user` is set.
    ExistingUsers,

    /// The global usage budget still has room.
    UsageRemaining,
}

impl Predicate {
    /// Evaluate against a promo.
    pub fn matches(&self, promo: &Promo) -> bool {
        match self {
            Predicate::CountryEquals(country) => promo.country == *country,
            Predicate::IsActive(active) => promo.is_active == *active,
            Predicate::StartsAtOrBefore(now) => promo.start_date.is_some_and(|start| start <= *now),
            Predicate::EndsAtOrAfter(now) => promo.end_date.is_some_and(|end| end >= *now),
            Predicate::EndsAfter(now) => promo.end_date.is_some_and(|end| end > *now),
            Predicate::PromoTypeIn(types) => types.contains(&promo.promo_type),
            Predicate::AllStores => promo.entitled_store.all,
            Predicate::ListedStore(store_id) => {
                promo.entitled_store.store_id && promo.prerequisite_store_id.contains(store_id)
            }
            Predicate::AllUsers => promo.entitled_user.all,
            Predicate::GuestUsers => promo.entitled_user.guest_user,
            Predicate::ExistingUsers => promo.entitled_user.existing_user,
            Predicate::UsageRemaining => promo.usage_limit.has_remaining(),
        }
    }

    /// Whether the predicate can be answered from stored fields alone.
    pub fn is_stored_field(&self) -> bool {
        !matches!(self, Predicate::UsageRemaining)
    }
}

/// Predicates that must all hold.
pub type Clause = SmallVec<[Predicate; 2]>;
