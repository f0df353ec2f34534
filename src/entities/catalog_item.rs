//! Catalog item entity - Reference data that ledger rows point to by id.
//!
//! Income methods, expense categories and expense types share one table and are
//! told apart by `kind`. Items are deactivated rather than deleted once referenced.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which catalog list an item belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// How income was received (cash, card, transfer...)
    #[sea_orm(string_value = "income_method")]
    IncomeMethod,
    /// What an expense was for
    #[sea_orm(string_value = "expense_category")]
    ExpenseCategory,
    /// How an expense was paid (cash, cheque...)
    #[sea_orm(string_value = "expense_type")]
    ExpenseType,
}

impl CatalogKind {
    /// Human-readable label used in log lines and error messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IncomeMethod => "income method",
            Self::ExpenseCategory => "expense category",
            Self::ExpenseType => "expense type",
        }
    }
}

/// Catalog item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Catalog list this item belongs to
    pub kind: CatalogKind,
    /// Display name, not required to be unique
    pub name: String,
    /// Logical deactivation flag; inactive items stay resolvable by id
    #[serde(rename = "active")]
    pub is_active: bool,
    /// Position in pick lists (lower first)
    pub sort_order: i32,
}

/// Catalog items are referenced by ledger rows but hold no references themselves
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
