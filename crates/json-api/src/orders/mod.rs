//! Orders

pub(crate) mod credit;
