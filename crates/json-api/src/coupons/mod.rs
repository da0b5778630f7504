//! Coupons

pub(crate) mod index;
