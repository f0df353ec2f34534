/// Database configuration and connection management
pub mod database;

/// Settings and seed lists loaded from ledger.toml
pub mod ledger;
