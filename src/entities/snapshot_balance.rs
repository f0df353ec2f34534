//! Snapshot balance entity - One account's balance inside a monthly snapshot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot balance database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snapshot_balances")]
pub struct Model {
    /// Unique identifier for the balance row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning snapshot
    pub snapshot_id: i64,
    /// Account the balance was read from
    pub account_id: i64,
    /// Balance at month end; may be negative for overdrawn accounts
    pub balance: f64,
}

/// Defines relationships between `SnapshotBalance` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each balance belongs to one snapshot
    #[sea_orm(
        belongs_to = "super::account_snapshot::Entity",
        from = "Column::SnapshotId",
        to = "super::account_snapshot::Column::Id",
        on_delete = "Cascade"
    )]
    Snapshot,
    /// Each balance refers to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Snapshot.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
