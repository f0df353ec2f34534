//! In-memory projection of the ledger for interactive front ends.
//!
//! The mirror is never authoritative. Every mutation goes to the database first, and only
//! the row the database confirms is applied to the projection, matched by id. A failed
//! mutation leaves the projection untouched. [`LedgerMirror::reload`] replaces the whole
//! projection with a fresh query and can always be used to resync.

use crate::{
    core::{
        aggregate::{self, MonthStats},
        ledger,
        snapshot::{self, LockPolicy},
    },
    errors::Result,
    models::{AccountSnapshot, ExpenseDraft, ExpenseEntry, IncomeDraft, IncomeEntry, LedgerData, SnapshotDraft},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, trace};

/// The mirrored rows, kept in the same order the database lists them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    /// Income entries, newest date first
    pub income: Vec<IncomeEntry>,
    /// Expense entries, newest date first
    pub expenses: Vec<ExpenseEntry>,
    /// Snapshots, newest month first
    pub snapshots: Vec<AccountSnapshot>,
}

impl Projection {
    fn sort(&mut self) {
        self.income
            .sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        self.expenses
            .sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        self.snapshots.sort_by(|a, b| b.month.cmp(&a.month));
    }

    fn put_income(&mut self, entry: IncomeEntry) {
        self.income.retain(|e| e.id != entry.id);
        self.income.push(entry);
        self.sort();
    }

    fn put_expense(&mut self, expense: ExpenseEntry) {
        self.expenses.retain(|e| e.id != expense.id);
        self.expenses.push(expense);
        self.sort();
    }

    fn put_snapshot(&mut self, snapshot: AccountSnapshot) {
        self.snapshots.retain(|s| s.id != snapshot.id);
        self.snapshots.push(snapshot);
        self.sort();
    }
}

/// A database connection paired with a reconciled in-memory projection of its ledger.
#[derive(Clone)]
pub struct LedgerMirror {
    db: Arc<DatabaseConnection>,
    lock_policy: LockPolicy,
    state: Arc<RwLock<Projection>>,
}

impl LedgerMirror {
    /// Creates an empty mirror. Call [`reload`](Self::reload) to populate it.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, lock_policy: LockPolicy) -> Self {
        Self {
            db,
            lock_policy,
            state: Arc::new(RwLock::new(Projection::default())),
        }
    }

    /// The underlying connection, for operations the mirror does not wrap.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Replaces the projection with the current database contents.
    ///
    /// The write lock is held while querying, so a mutation confirmed meanwhile is
    /// applied after the fresh rows rather than overwritten by them.
    pub async fn reload(&self) -> Result<()> {
        info!("Reloading ledger mirror...");
        let mut state = self.state.write().await;
        let data = ledger::load_ledger(&self.db).await?;
        let mut fresh = Projection {
            income: data.income,
            expenses: data.expenses,
            snapshots: snapshot::list_snapshots(&self.db).await?,
        };
        fresh.sort();
        *state = fresh;
        info!(
            "Ledger mirror reloaded with {} income, {} expense and {} snapshot row(s)",
            state.income.len(),
            state.expenses.len(),
            state.snapshots.len()
        );
        trace!("Ledger mirror now contains: {:?}", *state);
        Ok(())
    }

    /// Records income and mirrors the confirmed entry.
    pub async fn create_income(&self, draft: &IncomeDraft, created_by: &str) -> Result<IncomeEntry> {
        let entry = ledger::create_income(&self.db, draft, created_by).await?;
        self.state.write().await.put_income(entry.clone());
        Ok(entry)
    }

    /// Replaces income and mirrors the confirmed entry.
    pub async fn replace_income(&self, entry_id: i64, draft: &IncomeDraft) -> Result<IncomeEntry> {
        let entry = ledger::replace_income(&self.db, entry_id, draft).await?;
        self.state.write().await.put_income(entry.clone());
        Ok(entry)
    }

    /// Deletes income and drops it from the projection.
    pub async fn delete_income(&self, entry_id: i64) -> Result<()> {
        ledger::delete_income(&self.db, entry_id).await?;
        self.state.write().await.income.retain(|e| e.id != entry_id);
        debug!("Dropped income entry {} from mirror", entry_id);
        Ok(())
    }

    /// Records an expense and mirrors the confirmed row.
    pub async fn create_expense(&self, draft: &ExpenseDraft, created_by: &str) -> Result<ExpenseEntry> {
        let expense = ledger::create_expense(&self.db, draft, created_by).await?;
        self.state.write().await.put_expense(expense.clone());
        Ok(expense)
    }

    /// Replaces an expense and mirrors the confirmed row.
    pub async fn replace_expense(&self, expense_id: i64, draft: &ExpenseDraft) -> Result<ExpenseEntry> {
        let expense = ledger::replace_expense(&self.db, expense_id, draft).await?;
        self.state.write().await.put_expense(expense.clone());
        Ok(expense)
    }

    /// Deletes an expense and drops it from the projection.
    pub async fn delete_expense(&self, expense_id: i64) -> Result<()> {
        ledger::delete_expense(&self.db, expense_id).await?;
        self.state.write().await.expenses.retain(|e| e.id != expense_id);
        debug!("Dropped expense entry {} from mirror", expense_id);
        Ok(())
    }

    /// Upserts a snapshot under the mirror's lock policy and mirrors the result.
    pub async fn upsert_snapshot(&self, draft: &SnapshotDraft) -> Result<AccountSnapshot> {
        let saved = snapshot::upsert_snapshot(&self.db, draft, self.lock_policy).await?;
        self.state.write().await.put_snapshot(saved.clone());
        Ok(saved)
    }

    /// Locks or unlocks a month and mirrors the result.
    pub async fn set_snapshot_lock(&self, month: &str, locked: bool) -> Result<AccountSnapshot> {
        let saved = snapshot::set_snapshot_lock(&self.db, month, locked).await?;
        self.state.write().await.put_snapshot(saved.clone());
        Ok(saved)
    }

    /// A copy of the whole projection.
    pub async fn projection(&self) -> Projection {
        self.state.read().await.clone()
    }

    /// Mirrored income entries.
    pub async fn income(&self) -> Vec<IncomeEntry> {
        self.state.read().await.income.clone()
    }

    /// Mirrored expense entries.
    pub async fn expenses(&self) -> Vec<ExpenseEntry> {
        self.state.read().await.expenses.clone()
    }

    /// Mirrored snapshots.
    pub async fn snapshots(&self) -> Vec<AccountSnapshot> {
        self.state.read().await.snapshots.clone()
    }

    /// Mirrored income and expenses in the shape the aggregation functions take.
    pub async fn ledger_data(&self) -> LedgerData {
        let state = self.state.read().await;
        LedgerData {
            income: state.income.clone(),
            expenses: state.expenses.clone(),
        }
    }

    /// Month stats over the mirrored rows.
    pub async fn month_to_date(&self, reference: NaiveDate) -> MonthStats {
        aggregate::month_to_date_stats(&self.ledger_data().await, reference)
    }
}
