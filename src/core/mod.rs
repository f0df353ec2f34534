//! Core business logic - framework-agnostic catalog, ledger, snapshot and reporting operations.

/// Pure aggregation over loaded ledger data (daily, monthly, rolling, by category)
pub mod aggregate;
/// Calendar-day and month parsing shared by the ledger and snapshot manager
pub mod calendar;
/// Reference data: income methods, expense categories, expense types, accounts
pub mod catalog;
/// Income and expense entries
pub mod ledger;
/// Decoding of delimiter-packed line sets found in exported legacy rows
pub mod line_codec;
/// Portal-wide key-value settings
pub mod settings;
/// Monthly account balance snapshots
pub mod snapshot;
