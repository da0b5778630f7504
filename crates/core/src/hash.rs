//! Promo Hash
//!
//! Per-request lookup tables over the global candidate set and the customer's user promo rows.
//! Built fresh for each resolution and never persisted.

use rustc_hash::FxHashMap;

use crate::{
    promos::{Promo, PromoId},
    user_promos::UserPromo,
};

/// Documents that can be indexed by id and code.
pub trait Indexed {
    /// Document key.
    fn promo_id(&self) -> &PromoId;

    /// Human-facing code.
    fn promo_code(&self) -> &str;
}

impl Indexed for Promo {
    fn promo_id(&self) -> &PromoId {
        &self.promo_id
    }

    fn promo_code(&self) -> &str {
        &self.promo_code
    }
}

impl Indexed for UserPromo {
    fn promo_id(&self) -> &PromoId {
        &self.promo_id
    }

    fn promo_code(&self) -> &str {
        &self.promo_code
    }
}

/// Documents keyed by id, with a code index and their retrieval order.
#[derive(Debug, Clone)]
pub struct PromoIndex<T> {
    by_id: FxHashMap<PromoId, T>,
    by_code: FxHashMap<String, PromoId>,
    order: Vec<PromoId>,
}

impl<T> Default for PromoIndex<T> {
    fn default() -> Self {
        Self {
            by_id: FxHashMap::default(),
            by_code: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<T: Indexed> PromoIndex<T> {
    /// Index documents, keeping the first occurrence of a duplicated id.
    pub fn build(documents: impl IntoIterator<Item = T>) -> Self {
        let mut index = Self::default();

        for document in documents {
            let promo_id = document.promo_id().clone();

            if index.by_id.contains_key(&promo_id) {
                continue;
            }

            index
                .by_code
                .entry(document.promo_code().to_string())
                .or_insert_with(|| promo_id.clone());

            index.order.push(promo_id.clone());
            index.by_id.insert(promo_id, document);
        }

        index
    }

    /// Look up by id.
    pub fn get(&self, promo_id: &PromoId) -> Option<&T> {
        self.by_id.get(promo_id)
    }

    /// Whether an id is indexed.
    pub fn contains(&self, promo_id: &PromoId) -> bool {
        self.by_id.contains_key(promo_id)
    }

    /// Whether a code is indexed.
    pub fn contains_code(&self, promo_code: &str) -> bool {
        self.by_code.contains_key(promo_code)
    }

    /// Look up by code.
    pub fn get_by_code(&self, promo_code: &str) -> Option<&T> {
        self.by_code
            .get(promo_code)
            .and_then(|promo_id| self.by_id.get(promo_id))
    }

    /// Documents in retrieval order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|promo_id| self.by_id.get(promo_id))
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Global and user lookup tables for one resolution.
#[derive(Debug, Clone, Default)]
pub struct PromoHash {
    /// Global candidates.
    pub global: PromoIndex<Promo>,

    /// The customer's user promo rows.
    pub user: PromoIndex<UserPromo>,
}

impl PromoHash {
    /// Index a snapshot.
    pub fn build(global: Vec<Promo>, user: Vec<UserPromo>) -> Self {
        Self {
            global: PromoIndex::build(global),
            user: PromoIndex::build(user),
        }
    }
}
