//! Promo Engine
//!
//! Promotion eligibility and discount engine for a delivery platform: resolves which promotions a
//! request context is entitled to, prices shipping against them, and plans per-customer usage
//! bookkeeping. The crate is pure; persistence lives behind the application layer.

pub mod catalog;
pub mod conditions;
pub mod context;
pub mod coupons;
pub mod eligibility;
pub mod hash;
pub mod ids;
pub mod ledger;
pub mod locale;
pub mod promos;
pub mod receipt;
pub mod rules;
pub mod shipping;
pub mod user_promos;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
