//! Domain types exchanged with callers.
//!
//! Income entries and snapshots are hydrated from a header row plus child rows, so they
//! get their own structs here. Expenses, catalog items and accounts are flat and reuse
//! the entity models directly. Everything serializes with camelCase field names.

use crate::entities::{
    account, account_snapshot, catalog_item, expense_entry, income_entry, income_entry_line,
    snapshot_balance,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An expense entry as stored
pub type ExpenseEntry = expense_entry::Model;
/// An income method, expense category or expense type
pub type CatalogItem = catalog_item::Model;
/// A bank or cash account
pub type Account = account::Model;

/// One method/amount pair inside an income entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeLine {
    /// Income method catalog id
    pub method_id: i64,
    /// Amount received through that method
    pub amount: f64,
}

impl From<income_entry_line::Model> for IncomeLine {
    fn from(line: income_entry_line::Model) -> Self {
        Self {
            method_id: line.method_id,
            amount: line.amount,
        }
    }
}

/// A day's income, split across payment methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    /// Entry id
    pub id: i64,
    /// Calendar day
    pub date: NaiveDate,
    /// Free-form notes
    pub notes: String,
    /// Username of the recorder
    pub created_by: String,
    /// The entry's full value content
    pub lines: Vec<IncomeLine>,
}

impl IncomeEntry {
    /// Builds a hydrated entry from its header row and line set.
    #[must_use]
    pub fn from_parts(header: income_entry::Model, lines: Vec<IncomeLine>) -> Self {
        Self {
            id: header.id,
            date: header.date,
            notes: header.notes,
            created_by: header.created_by,
            lines,
        }
    }

    /// Sum of all line amounts; zero for an entry without lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().fold(0.0, |acc, line| acc + line.amount)
    }
}

/// Caller-supplied content for creating or replacing an income entry.
///
/// The date arrives as text and is validated by the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDraft {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Replacement line set
    #[serde(default)]
    pub lines: Vec<IncomeLine>,
}

/// Caller-supplied content for creating or replacing an expense entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Who was paid
    pub vendor: String,
    /// Amount paid
    pub amount: f64,
    /// Expense type catalog id
    pub payment_type_id: i64,
    /// Expense category catalog id
    pub category_id: i64,
    /// Cheque number, expected when the payment type is a cheque
    #[serde(default)]
    pub cheque_no: Option<String>,
    /// Free-form justification
    #[serde(default)]
    pub reason: Option<String>,
    /// Receipt or invoice payload
    #[serde(default)]
    pub attachment: Option<Vec<u8>>,
}

/// One account's balance inside a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    /// Account id
    pub account_id: i64,
    /// Balance at month end
    pub balance: f64,
}

impl From<snapshot_balance::Model> for AccountBalance {
    fn from(row: snapshot_balance::Model) -> Self {
        Self {
            account_id: row.account_id,
            balance: row.balance,
        }
    }
}

/// A month's frozen account balances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    /// Snapshot id, stable across re-submissions of the same month
    pub id: i64,
    /// First day of the month
    pub month: NaiveDate,
    /// Advisory (or enforced, depending on policy) edit lock
    pub is_locked: bool,
    /// One balance per account
    pub balances: Vec<AccountBalance>,
}

impl AccountSnapshot {
    /// Builds a hydrated snapshot from its header row and balance set.
    #[must_use]
    pub fn from_parts(header: account_snapshot::Model, balances: Vec<AccountBalance>) -> Self {
        Self {
            id: header.id,
            month: header.month,
            is_locked: header.is_locked,
            balances,
        }
    }

    /// Sum of all account balances in the snapshot.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.balances.iter().fold(0.0, |acc, b| acc + b.balance)
    }
}

/// Caller-supplied content for a snapshot upsert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDraft {
    /// `YYYY-MM` or any `YYYY-MM-DD` inside the month
    pub month: String,
    /// Replacement balance set
    #[serde(default)]
    pub balances: Vec<AccountBalance>,
    /// Lock flag to store; new snapshots default to locked
    #[serde(default = "default_locked")]
    pub is_locked: bool,
}

const fn default_locked() -> bool {
    true
}

/// Everything the aggregation functions read, in ledger list order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerData {
    /// Income entries, newest date first
    pub income: Vec<IncomeEntry>,
    /// Expense entries, newest date first
    pub expenses: Vec<ExpenseEntry>,
}
