//! Ledger configuration loading from ledger.toml
//!
//! The file carries application settings plus the catalog lists and accounts that are
//! seeded into the database on start. Every section is optional; a missing section
//! means "nothing to seed" or the default setting.

use crate::core::snapshot::LockPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Configuration structure representing the entire ledger.toml file
#[derive(Debug, Default, Deserialize)]
pub struct LedgerConfig {
    /// Application-wide settings
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Income methods to seed
    #[serde(default)]
    pub income_methods: Vec<CatalogSeed>,
    /// Expense categories to seed
    #[serde(default)]
    pub expense_categories: Vec<CatalogSeed>,
    /// Expense types to seed
    #[serde(default)]
    pub expense_types: Vec<CatalogSeed>,
    /// Accounts to seed
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

/// Application-wide settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SettingsConfig {
    /// Company name shown on reports, seeded into the settings table if absent
    pub company_name: String,
    /// Whether locked snapshots reject re-submission
    pub lock_policy: LockPolicy,
    /// Length of the dashboard's rolling daily series
    pub rolling_days: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            company_name: "My Business".to_string(),
            lock_policy: LockPolicy::default(),
            rolling_days: 30,
        }
    }
}

/// One income method, expense category or expense type to seed
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSeed {
    /// Display name
    pub name: String,
    /// Position in pick lists; unset means "after everything else"
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// One account to seed
#[derive(Debug, Deserialize, Clone)]
pub struct AccountSeed {
    /// Display name, also the seeding match key
    pub name: String,
    /// Free-form type such as "bank" or "cash"
    #[serde(rename = "type", default)]
    pub account_type: String,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Loads ledger configuration from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or does not parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LedgerConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read config file {}: {e}",
            path.as_ref().display()
        ),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse ledger.toml: {e}"),
    })
}

/// Loads ledger configuration from the default location (./ledger.toml)
pub fn load_default_config() -> Result<LedgerConfig> {
    load_config(DEFAULT_CONFIG_PATH)
}
