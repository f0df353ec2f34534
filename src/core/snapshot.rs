//! Snapshot business logic - Monthly account balances.
//!
//! A month has at most one snapshot, keyed by its first day. Submitting a month that
//! already has a snapshot keeps the snapshot's id and replaces its lock flag and full
//! balance set. Snapshots are never deleted.

use crate::{
    core::calendar,
    entities::{Account, AccountSnapshot, SnapshotBalance, account, account_snapshot, snapshot_balance},
    errors::{Error, Result, conflict_on_race},
    models::{self, AccountBalance, SnapshotDraft},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

/// How the `is_locked` flag is treated on re-submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockPolicy {
    /// The flag is informational; locked months can still be re-submitted
    #[default]
    Advisory,
    /// Re-submitting a locked month fails with a conflict until it is unlocked
    Enforced,
}

fn validate_balances(balances: &[AccountBalance]) -> Result<()> {
    let mut seen = HashSet::new();
    for balance in balances {
        if !balance.balance.is_finite() {
            return Err(Error::validation(format!(
                "balance for account {} must be a finite number",
                balance.account_id
            )));
        }
        if !seen.insert(balance.account_id) {
            return Err(Error::validation(format!(
                "account {} appears more than once in the snapshot",
                balance.account_id
            )));
        }
    }
    Ok(())
}

async fn ensure_accounts_exist<C>(db: &C, balances: &[AccountBalance]) -> Result<()>
where
    C: ConnectionTrait,
{
    if balances.is_empty() {
        return Ok(());
    }
    let wanted: Vec<i64> = balances.iter().map(|b| b.account_id).collect();
    let found: HashSet<i64> = Account::find()
        .filter(account::Column::Id.is_in(wanted.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::validation(format!("unknown account id {missing}"))),
        None => Ok(()),
    }
}

async fn balances_for<C>(db: &C, snapshot_ids: Option<&[i64]>) -> Result<HashMap<i64, Vec<AccountBalance>>>
where
    C: ConnectionTrait,
{
    let mut query = SnapshotBalance::find();
    if let Some(ids) = snapshot_ids {
        query = query.filter(snapshot_balance::Column::SnapshotId.is_in(ids.to_vec()));
    }
    let rows = query
        .order_by_asc(snapshot_balance::Column::AccountId)
        .all(db)
        .await?;

    let mut grouped: HashMap<i64, Vec<AccountBalance>> = HashMap::new();
    for row in rows {
        grouped.entry(row.snapshot_id).or_default().push(row.into());
    }
    Ok(grouped)
}

/// Creates the month's snapshot, or replaces the balances and lock flag of the
/// existing one while keeping its id.
///
/// # Errors
/// - [`Error::Validation`] for a malformed month, a non-finite balance, an account that
///   appears twice, or an unknown account id
/// - [`Error::Conflict`] when `policy` is [`LockPolicy::Enforced`] and the month is
///   locked, or when another caller created the same month first
#[instrument(skip(db, draft), fields(month = %draft.month, balances = draft.balances.len()))]
pub async fn upsert_snapshot(
    db: &DatabaseConnection,
    draft: &SnapshotDraft,
    policy: LockPolicy,
) -> Result<models::AccountSnapshot> {
    let month = calendar::parse_month(&draft.month)?;
    validate_balances(&draft.balances)?;

    // Header and balance set are replaced as one unit
    let txn = db.begin().await?;
    ensure_accounts_exist(&txn, &draft.balances).await?;

    let existing = AccountSnapshot::find()
        .filter(account_snapshot::Column::Month.eq(month))
        .one(&txn)
        .await?;

    let header = match existing {
        Some(snapshot) => {
            if snapshot.is_locked && policy == LockPolicy::Enforced {
                return Err(Error::conflict(format!(
                    "snapshot for {} is locked",
                    calendar::month_key(month)
                )));
            }
            if snapshot.is_locked {
                warn!(
                    "Overwriting locked snapshot for {}",
                    calendar::month_key(month)
                );
            }

            SnapshotBalance::delete_many()
                .filter(snapshot_balance::Column::SnapshotId.eq(snapshot.id))
                .exec(&txn)
                .await?;

            let mut active: account_snapshot::ActiveModel = snapshot.into();
            active.is_locked = Set(draft.is_locked);
            active.updated_at = Set(Utc::now());
            active
                .update(&txn)
                .await
                .map_err(|e| conflict_on_race(e, "snapshot changed while it was being replaced"))?
        }
        None => account_snapshot::ActiveModel {
            month: Set(month),
            is_locked: Set(draft.is_locked),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_on_race(e, "snapshot for this month was created concurrently"))?,
    };

    if !draft.balances.is_empty() {
        let rows = draft.balances.iter().map(|b| snapshot_balance::ActiveModel {
            snapshot_id: Set(header.id),
            account_id: Set(b.account_id),
            balance: Set(b.balance),
            ..Default::default()
        });
        SnapshotBalance::insert_many(rows).exec(&txn).await?;
    }

    txn.commit().await?;

    let mut balances = draft.balances.clone();
    balances.sort_by_key(|b| b.account_id);
    let snapshot = models::AccountSnapshot::from_parts(header, balances);
    info!(
        "Saved snapshot {} for {} with total {:.2}",
        snapshot.id,
        calendar::month_key(snapshot.month),
        snapshot.total()
    );
    Ok(snapshot)
}

/// Lists every snapshot, newest month first. Balances are ordered by account id.
///
/// Headers and balances come from one transaction, so a snapshot is never seen
/// mid-replace with an empty balance set.
pub async fn list_snapshots(db: &DatabaseConnection) -> Result<Vec<models::AccountSnapshot>> {
    let txn = db.begin().await?;
    let headers = AccountSnapshot::find()
        .order_by_desc(account_snapshot::Column::Month)
        .all(&txn)
        .await?;
    let mut balances = balances_for(&txn, None).await?;
    txn.commit().await?;

    Ok(headers
        .into_iter()
        .map(|header| {
            let set = balances.remove(&header.id).unwrap_or_default();
            models::AccountSnapshot::from_parts(header, set)
        })
        .collect())
}

async fn find_by_month<C>(db: &C, month: &str) -> Result<Option<account_snapshot::Model>>
where
    C: ConnectionTrait,
{
    let month = calendar::parse_month(month)?;
    AccountSnapshot::find()
        .filter(account_snapshot::Column::Month.eq(month))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the snapshot for a month given as `YYYY-MM` or `YYYY-MM-DD`.
pub async fn get_snapshot(
    db: &DatabaseConnection,
    month: &str,
) -> Result<Option<models::AccountSnapshot>> {
    let txn = db.begin().await?;
    let Some(header) = find_by_month(&txn, month).await? else {
        return Ok(None);
    };
    let mut balances = balances_for(&txn, Some(std::slice::from_ref(&header.id))).await?;
    txn.commit().await?;

    let set = balances.remove(&header.id).unwrap_or_default();
    Ok(Some(models::AccountSnapshot::from_parts(header, set)))
}

/// Locks or unlocks a month without touching its balances. Allowed under every
/// [`LockPolicy`].
///
/// # Errors
/// Returns [`Error::NotFound`] when the month has no snapshot.
#[instrument(skip(db))]
pub async fn set_snapshot_lock(
    db: &DatabaseConnection,
    month: &str,
    locked: bool,
) -> Result<models::AccountSnapshot> {
    let txn = db.begin().await?;
    let header = find_by_month(&txn, month)
        .await?
        .ok_or_else(|| Error::not_found("snapshot", month))?;

    let mut active: account_snapshot::ActiveModel = header.into();
    active.is_locked = Set(locked);
    active.updated_at = Set(Utc::now());
    let header = active
        .update(&txn)
        .await
        .map_err(|e| conflict_on_race(e, "snapshot changed while its lock was being set"))?;
    let mut balances = balances_for(&txn, Some(std::slice::from_ref(&header.id))).await?;
    txn.commit().await?;

    info!(
        "Snapshot for {} is now {}",
        calendar::month_key(header.month),
        if locked { "locked" } else { "unlocked" }
    );
    let set = balances.remove(&header.id).unwrap_or_default();
    Ok(models::AccountSnapshot::from_parts(header, set))
}
