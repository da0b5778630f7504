//! Country header resolution.

use promo_engine::locale::Locale;
use salvo::Request;

pub(crate) const COUNTRY_HEADER: &str = "x-country";

pub(crate) trait CountryExt {
    /// Supported country from the `x-country` header, else from the body, else the default.
    fn resolve_country(&self, locale: &Locale, body_country: Option<&str>) -> String;
}

impl CountryExt for Request {
    fn resolve_country(&self, locale: &Locale, body_country: Option<&str>) -> String {
        let header = self.header::<String>(COUNTRY_HEADER);

        locale.resolve([header.as_deref(), body_country])
    }
}
