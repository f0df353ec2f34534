//! Income entry line entity - One method/amount pair belonging to an income entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Income line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "income_entry_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning income entry
    pub entry_id: i64,
    /// Income method (catalog item) the amount was received through
    pub method_id: i64,
    /// Amount received, never negative
    pub amount: f64,
}

/// Defines relationships between `IncomeEntryLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one entry
    #[sea_orm(
        belongs_to = "super::income_entry::Entity",
        from = "Column::EntryId",
        to = "super::income_entry::Column::Id",
        on_delete = "Cascade"
    )]
    Entry,
    /// Each line points at one income method
    #[sea_orm(
        belongs_to = "super::catalog_item::Entity",
        from = "Column::MethodId",
        to = "super::catalog_item::Column::Id"
    )]
    Method,
}

impl Related<super::income_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entry.def()
    }
}

impl Related<super::catalog_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Method.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
