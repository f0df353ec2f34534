//! Account entity - Bank and cash accounts whose balances are frozen in monthly snapshots.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Main Checking")
    pub name: String,
    /// Free-form account type (e.g., "bank", "cash")
    pub account_type: String,
    /// Currency code the balance is kept in; never converted
    pub currency: String,
    /// Hidden from pick lists when false
    #[serde(rename = "active")]
    pub is_active: bool,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Snapshot balance rows recorded for this account
    #[sea_orm(has_many = "super::snapshot_balance::Entity")]
    SnapshotBalances,
}

impl Related<super::snapshot_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SnapshotBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
