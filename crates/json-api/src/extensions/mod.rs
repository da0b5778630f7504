//! Extension traits

mod country;
mod depot;
mod result;

pub(crate) use country::{COUNTRY_HEADER, CountryExt as _};
pub(crate) use depot::DepotExt as _;
pub(crate) use result::ResultExt as _;
