//! Shared test utilities for the ledger engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog rows, entries and snapshots with sensible defaults.

use crate::{
    core::{
        catalog, ledger,
        snapshot::{self, LockPolicy},
    },
    entities::CatalogKind,
    errors::Result,
    models::{
        Account, AccountBalance, AccountSnapshot, CatalogItem, ExpenseDraft, ExpenseEntry,
        IncomeDraft, IncomeEntry, IncomeLine, SnapshotDraft,
    },
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A small catalog covering every kind, created by [`setup_with_catalog`].
pub struct TestCatalog {
    /// Income method "Cash"
    pub cash: CatalogItem,
    /// Income method "Card"
    pub card: CatalogItem,
    /// Income method "Transfer"
    pub transfer: CatalogItem,
    /// Expense category "Supplies"
    pub supplies: CatalogItem,
    /// Expense category "Rent"
    pub rent: CatalogItem,
    /// Expense type "Cash"
    pub cash_payment: CatalogItem,
    /// Expense type "Cheque"
    pub cheque: CatalogItem,
    /// Bank account "Checking"
    pub checking: Account,
    /// Bank account "Savings"
    pub savings: Account,
}

/// Sets up a test database with one catalog of each kind.
/// Returns (db, catalog) for ledger and snapshot tests.
pub async fn setup_with_catalog() -> Result<(DatabaseConnection, TestCatalog)> {
    let db = setup_test_db().await?;
    let catalog = TestCatalog {
        cash: catalog::create_item(&db, CatalogKind::IncomeMethod, "Cash", Some(1)).await?,
        card: catalog::create_item(&db, CatalogKind::IncomeMethod, "Card", Some(2)).await?,
        transfer: catalog::create_item(&db, CatalogKind::IncomeMethod, "Transfer", None).await?,
        supplies: catalog::create_item(&db, CatalogKind::ExpenseCategory, "Supplies", None)
            .await?,
        rent: catalog::create_item(&db, CatalogKind::ExpenseCategory, "Rent", None).await?,
        cash_payment: catalog::create_item(&db, CatalogKind::ExpenseType, "Cash", None).await?,
        cheque: catalog::create_item(&db, CatalogKind::ExpenseType, "Cheque", None).await?,
        checking: catalog::create_account(&db, "Checking", "bank", "USD").await?,
        savings: catalog::create_account(&db, "Savings", "bank", "USD").await?,
    };
    Ok((db, catalog))
}

/// Builds an income draft with empty notes.
pub fn income_draft(date: &str, lines: &[(i64, f64)]) -> IncomeDraft {
    IncomeDraft {
        date: date.to_string(),
        notes: String::new(),
        lines: lines
            .iter()
            .map(|&(method_id, amount)| IncomeLine { method_id, amount })
            .collect(),
    }
}

/// Builds an expense draft paid to "Stationers" with no cheque number,
/// reason or attachment.
pub fn expense_draft(
    date: &str,
    amount: f64,
    payment_type_id: i64,
    category_id: i64,
) -> ExpenseDraft {
    ExpenseDraft {
        date: date.to_string(),
        vendor: "Stationers".to_string(),
        amount,
        payment_type_id,
        category_id,
        cheque_no: None,
        reason: None,
        attachment: None,
    }
}

/// Builds a locked snapshot draft.
pub fn snapshot_draft(month: &str, balances: &[(i64, f64)]) -> SnapshotDraft {
    SnapshotDraft {
        month: month.to_string(),
        balances: balances
            .iter()
            .map(|&(account_id, balance)| AccountBalance {
                account_id,
                balance,
            })
            .collect(),
        is_locked: true,
    }
}

/// Records an income entry created by `"test_user"`.
pub async fn create_test_income(
    db: &DatabaseConnection,
    date: &str,
    lines: &[(i64, f64)],
) -> Result<IncomeEntry> {
    ledger::create_income(db, &income_draft(date, lines), "test_user").await
}

/// Records a cash-paid "Supplies" expense created by `"test_user"`.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    date: &str,
    amount: f64,
    catalog: &TestCatalog,
) -> Result<ExpenseEntry> {
    let draft = expense_draft(date, amount, catalog.cash_payment.id, catalog.supplies.id);
    ledger::create_expense(db, &draft, "test_user").await
}

/// Upserts a locked snapshot under the advisory lock policy.
pub async fn create_test_snapshot(
    db: &DatabaseConnection,
    month: &str,
    balances: &[(i64, f64)],
) -> Result<AccountSnapshot> {
    snapshot::upsert_snapshot(db, &snapshot_draft(month, balances), LockPolicy::Advisory).await
}
