//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod account_snapshot;
pub mod app_setting;
pub mod catalog_item;
pub mod expense_entry;
pub mod income_entry;
pub mod income_entry_line;
pub mod snapshot_balance;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use account_snapshot::{
    Column as AccountSnapshotColumn, Entity as AccountSnapshot, Model as AccountSnapshotModel,
};
pub use app_setting::{Column as AppSettingColumn, Entity as AppSetting, Model as AppSettingModel};
pub use catalog_item::{
    CatalogKind, Column as CatalogItemColumn, Entity as CatalogItem, Model as CatalogItemModel,
};
pub use expense_entry::{
    Column as ExpenseEntryColumn, Entity as ExpenseEntry, Model as ExpenseEntryModel,
};
pub use income_entry::{
    Column as IncomeEntryColumn, Entity as IncomeEntry, Model as IncomeEntryModel,
};
pub use income_entry_line::{
    Column as IncomeEntryLineColumn, Entity as IncomeEntryLine, Model as IncomeEntryLineModel,
};
pub use snapshot_balance::{
    Column as SnapshotBalanceColumn, Entity as SnapshotBalance, Model as SnapshotBalanceModel,
};
