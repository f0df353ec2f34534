//! Account snapshot entity - The header of a month's frozen account balances.
//!
//! `month` is always the first day of the month and is unique, so a month can only
//! ever have one snapshot. Re-submitting a month replaces its balance rows.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account snapshot header model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_snapshots")]
pub struct Model {
    /// Unique identifier, preserved across re-submissions of the same month
    #[sea_orm(primary_key)]
    pub id: i64,
    /// First day of the snapshot month
    #[sea_orm(unique)]
    pub month: NaiveDate,
    /// Whether the month is closed for edits
    pub is_locked: bool,
    /// When the balance set was last written
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `AccountSnapshot` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One snapshot has one balance row per account
    #[sea_orm(has_many = "super::snapshot_balance::Entity")]
    Balances,
}

impl Related<super::snapshot_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
