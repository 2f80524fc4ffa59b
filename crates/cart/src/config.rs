//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `OF_CART_PATH` - File that holds the cart storage document (default: `.of_cart.json`)
//! - `OF_CART_KEY` - Storage key for the cart blob (default: `of_cart_v1`)
//! - `OF_CATALOG_PATH` - JSON catalog file (default: built-in seed catalog)
//! - `OF_QUANTITY_POLICY` - `ignore` or `reject` for non-positive quantities (default: `ignore`)

use std::path::PathBuf;

use organic_farm_core::CurrencyCode;

use crate::catalog::Catalog;
use crate::error::{CatalogError, ConfigError};
use crate::storage::FileStorage;
use crate::store::{CartStore, DEFAULT_CART_KEY, QuantityPolicy};

const DEFAULT_CART_PATH: &str = ".of_cart.json";

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Location of the file-backed storage document
    pub storage_path: PathBuf,
    /// Key the cart blob is stored under
    pub storage_key: String,
    /// Catalog file; `None` uses [`Catalog::seed`]
    pub catalog_path: Option<PathBuf>,
    /// Handling of non-positive quantities
    pub quantity_policy: QuantityPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_CART_PATH),
            storage_key: DEFAULT_CART_KEY.to_owned(),
            catalog_path: None,
            quantity_policy: QuantityPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_path = get("OF_CART_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.storage_path, PathBuf::from);

        let storage_key = match get("OF_CART_KEY") {
            Some(key) if key.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "OF_CART_KEY".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(key) => key,
            None => defaults.storage_key,
        };

        let catalog_path = get("OF_CATALOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let quantity_policy = match get("OF_QUANTITY_POLICY") {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("OF_QUANTITY_POLICY".to_string(), e))?,
            None => defaults.quantity_policy,
        };

        Ok(Self {
            storage_path,
            storage_key,
            catalog_path,
            quantity_policy,
        })
    }

    /// Open the file-backed cart store described by this configuration.
    #[must_use]
    pub fn open_store(&self) -> CartStore {
        CartStore::new(FileStorage::new(&self.storage_path))
            .with_key(self.storage_key.clone())
            .with_policy(self.quantity_policy)
    }

    /// Load the configured catalog, or the seed catalog if none is set.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog file cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_path(path, CurrencyCode::INR),
            None => Ok(Catalog::seed()),
        }
    }
}
