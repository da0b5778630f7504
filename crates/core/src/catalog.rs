//! Promo catalogs
//!
//! YAML promo catalogs, used to seed repositories and to drive the pure pipeline in tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    locale::Locale,
    promos::Promo,
    user_promos::UserPromo,
    validation::{PromoDraft, ValidationError},
};

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,

        /// Underlying error.
        source: std::io::Error,
    },

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A promo failed validation.
    #[error("promo #{index} is invalid: {source}")]
    Invalid {
        /// Position in the catalog.
        index: usize,

        /// Validation failure.
        source: ValidationError,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    promos: Vec<PromoDraft>,

    #[serde(default)]
    user_promos: Vec<UserPromo>,
}

/// Validated promos plus any customer rows the catalog seeds.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Global promos, in file order.
    pub promos: Vec<Promo>,

    /// Customer rows.
    pub user_promos: Vec<UserPromo>,
}

impl Catalog {
    /// Load `promos/<name>.yml` under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed, or a promo is invalid.
    pub fn load(base_path: impl AsRef<Path>, name: &str) -> Result<Self, CatalogError> {
        Self::load_with_locale(base_path, name, &Locale::default())
    }

    /// Load a catalog, normalising countries against `locale`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed, or a promo is invalid.
    pub fn load_with_locale(
        base_path: impl AsRef<Path>,
        name: &str,
        locale: &Locale,
    ) -> Result<Self, CatalogError> {
        let path = base_path.as_ref().join("promos").join(format!("{name}.yml"));

        let contents = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&contents, locale)
    }

    /// Parse catalog YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the YAML is malformed or a promo is invalid.
    pub fn parse(contents: &str, locale: &Locale) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_norway::from_str(contents)?;

        let promos = file
            .promos
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate(locale)
                    .map_err(|source| CatalogError::Invalid { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            promos,
            user_promos: file.user_promos,
        })
    }
}
