//! Served countries

use smallvec::{SmallVec, smallvec};

/// Default country for requests that do not name a supported one.
pub const DEFAULT_COUNTRY: &str = "US";

/// The set of countries promos are served in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    default_country: String,
    supported: SmallVec<[String; 4]>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            default_country: DEFAULT_COUNTRY.to_string(),
            supported: smallvec![DEFAULT_COUNTRY.to_string(), "CA".to_string()],
        }
    }
}

impl Locale {
    /// Build a locale; the default country is always supported.
    pub fn new(default_country: impl Into<String>, supported: impl IntoIterator<Item = String>) -> Self {
        let default_country = default_country.into().to_uppercase();

        let mut supported: SmallVec<[String; 4]> = supported
            .into_iter()
            .map(|country| country.trim().to_uppercase())
            .filter(|country| !country.is_empty())
            .collect();

        if !supported.contains(&default_country) {
            supported.push(default_country.clone());
        }

        Self {
            default_country,
            supported,
        }
    }

    /// Default country.
    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Whether a country is served.
    pub fn is_supported(&self, country: &str) -> bool {
        self.supported
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(country))
    }

    /// The first supported candidate, upper-cased, or the default country.
    pub fn resolve<'a>(&self, candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|country| self.is_supported(country))
            .map_or_else(|| self.default_country.clone(), str::to_uppercase)
    }
}
