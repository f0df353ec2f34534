//! Income entry entity - The header row of one day's recorded income.
//!
//! The amounts live in `income_entry_lines`; an entry's value is always the sum of its lines.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Income entry header model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "income_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar day the income belongs to
    pub date: NaiveDate,
    /// Free-form notes
    pub notes: String,
    /// Username of whoever recorded the entry
    pub created_by: String,
    /// When the entry was first recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `IncomeEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One entry has many method/amount lines
    #[sea_orm(has_many = "super::income_entry_line::Entity")]
    Lines,
}

impl Related<super::income_entry_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
