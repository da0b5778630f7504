//! Promo Handlers

pub(crate) mod search;
pub(crate) mod upsert;
pub(crate) mod usage;
