//! Expense entry entity - A single vendor payment on one day.
//!
//! Expenses have no child rows, so replacing one is a single-row update.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_entries")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar day the expense belongs to
    pub date: NaiveDate,
    /// Who was paid
    pub vendor: String,
    /// Amount paid, never negative
    pub amount: f64,
    /// Expense type (catalog item) describing how it was paid
    pub payment_type_id: i64,
    /// Expense category (catalog item) describing what it was for
    pub category_id: i64,
    /// Cheque number when paid by cheque
    pub cheque_no: Option<String>,
    /// Free-form justification
    pub reason: Option<String>,
    /// Receipt or invoice payload
    pub attachment: Option<Vec<u8>>,
    /// Username of whoever recorded the expense
    pub created_by: String,
    /// When the expense was first recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ExpenseEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The payment type catalog item
    #[sea_orm(
        belongs_to = "super::catalog_item::Entity",
        from = "Column::PaymentTypeId",
        to = "super::catalog_item::Column::Id",
        fk_name = "fk-expense_entries-payment_type"
    )]
    PaymentType,
    /// The category catalog item
    #[sea_orm(
        belongs_to = "super::catalog_item::Entity",
        from = "Column::CategoryId",
        to = "super::catalog_item::Column::Id",
        fk_name = "fk-expense_entries-category"
    )]
    Category,
}

impl ActiveModelBehavior for ActiveModel {}
