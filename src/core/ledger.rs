//! Ledger business logic - Income and expense entries.
//!
//! An income entry is a header row plus a set of method/amount line rows. The line set
//! is the entry's whole value, so it is never patched: every create or replace writes the
//! header and the complete new line set inside one database transaction, and a failure
//! anywhere rolls both halves back. Expenses are single rows.
//!
//! Listings are ordered by date (newest first) and then by id (latest insert first), so
//! ties on the same day always come back in the same order.

use crate::{
    core::{calendar, catalog, line_codec},
    entities::{CatalogKind, ExpenseEntry, IncomeEntry, IncomeEntryLine, expense_entry, income_entry, income_entry_line},
    errors::{Error, Result, conflict_on_race},
    models::{self, ExpenseDraft, IncomeDraft, IncomeLine, LedgerData},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Name an expense type must carry (case-insensitive) for a cheque number to be expected
pub const CHEQUE_TYPE_NAME: &str = "cheque";

fn validate_amount(amount: f64, what: &str) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::validation(format!("{what} must be a finite number")));
    }
    if amount < 0.0 {
        return Err(Error::validation(format!(
            "{what} cannot be negative (got {amount})"
        )));
    }
    Ok(())
}

fn validate_lines(lines: &[IncomeLine]) -> Result<()> {
    for line in lines {
        validate_amount(line.amount, "income line amount")?;
    }
    Ok(())
}

fn method_ids(lines: &[IncomeLine]) -> Vec<i64> {
    lines.iter().map(|line| line.method_id).collect()
}

async fn insert_lines<C>(db: &C, entry_id: i64, lines: &[IncomeLine]) -> Result<()>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Ok(());
    }
    let rows = lines.iter().map(|line| income_entry_line::ActiveModel {
        entry_id: Set(entry_id),
        method_id: Set(line.method_id),
        amount: Set(line.amount),
        ..Default::default()
    });
    IncomeEntryLine::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn lines_by_entry<C>(db: &C, entry_ids: Option<&[i64]>) -> Result<HashMap<i64, Vec<IncomeLine>>>
where
    C: ConnectionTrait,
{
    let mut query = IncomeEntryLine::find();
    if let Some(ids) = entry_ids {
        query = query.filter(income_entry_line::Column::EntryId.is_in(ids.to_vec()));
    }
    let rows = query
        .order_by_asc(income_entry_line::Column::Id)
        .all(db)
        .await?;

    let mut grouped: HashMap<i64, Vec<IncomeLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.entry_id).or_default().push(row.into());
    }
    Ok(grouped)
}

async fn query_income<C>(db: &C) -> Result<Vec<models::IncomeEntry>>
where
    C: ConnectionTrait,
{
    let headers = IncomeEntry::find()
        .order_by_desc(income_entry::Column::Date)
        .order_by_desc(income_entry::Column::Id)
        .all(db)
        .await?;
    let mut lines = lines_by_entry(db, None).await?;

    Ok(headers
        .into_iter()
        .map(|header| {
            let entry_lines = lines.remove(&header.id).unwrap_or_default();
            models::IncomeEntry::from_parts(header, entry_lines)
        })
        .collect())
}

async fn query_expenses<C>(db: &C) -> Result<Vec<expense_entry::Model>>
where
    C: ConnectionTrait,
{
    ExpenseEntry::find()
        .order_by_desc(expense_entry::Column::Date)
        .order_by_desc(expense_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every income entry with its lines, newest date first.
///
/// Headers and lines are read in one transaction, so an entry is never seen without
/// the lines a concurrent writer committed with it.
pub async fn list_income(db: &DatabaseConnection) -> Result<Vec<models::IncomeEntry>> {
    let txn = db.begin().await?;
    let entries = query_income(&txn).await?;
    txn.commit().await?;
    Ok(entries)
}

/// Finds one income entry with its lines.
pub async fn get_income(
    db: &DatabaseConnection,
    entry_id: i64,
) -> Result<Option<models::IncomeEntry>> {
    let txn = db.begin().await?;
    let Some(header) = IncomeEntry::find_by_id(entry_id).one(&txn).await? else {
        return Ok(None);
    };
    let mut lines = lines_by_entry(&txn, Some(std::slice::from_ref(&entry_id))).await?;
    txn.commit().await?;

    let entry_lines = lines.remove(&entry_id).unwrap_or_default();
    Ok(Some(models::IncomeEntry::from_parts(header, entry_lines)))
}

/// Records a new income entry and its lines as one unit.
///
/// # Errors
/// Returns [`Error::Validation`] if the date is not a real calendar date, a line amount
/// is negative or not finite, or a line names an unknown income method. Nothing is
/// written in that case.
#[instrument(skip(db, draft), fields(date = %draft.date, lines = draft.lines.len()))]
pub async fn create_income(
    db: &DatabaseConnection,
    draft: &IncomeDraft,
    created_by: &str,
) -> Result<models::IncomeEntry> {
    let date = calendar::parse_entry_date(&draft.date)?;
    validate_lines(&draft.lines)?;

    // Header and lines commit together or not at all
    let txn = db.begin().await?;
    catalog::ensure_items_exist(&txn, CatalogKind::IncomeMethod, &method_ids(&draft.lines)).await?;

    let header = income_entry::ActiveModel {
        date: Set(date),
        notes: Set(draft.notes.trim().to_string()),
        created_by: Set(created_by.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_lines(&txn, header.id, &draft.lines).await?;

    txn.commit().await?;

    let entry = models::IncomeEntry::from_parts(header, draft.lines.clone());
    info!("Recorded income entry {} totalling {:.2}", entry.id, entry.total());
    Ok(entry)
}

/// Replaces an income entry's date, notes and complete line set.
///
/// All existing lines are deleted and the new set inserted, whatever the line counts.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id, [`Error::Conflict`] if the entry
/// vanished mid-replace, and the same validation errors as [`create_income`].
#[instrument(skip(db, draft), fields(date = %draft.date, lines = draft.lines.len()))]
pub async fn replace_income(
    db: &DatabaseConnection,
    entry_id: i64,
    draft: &IncomeDraft,
) -> Result<models::IncomeEntry> {
    let date = calendar::parse_entry_date(&draft.date)?;
    validate_lines(&draft.lines)?;

    let txn = db.begin().await?;
    let existing = IncomeEntry::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("income entry", entry_id))?;
    catalog::ensure_items_exist(&txn, CatalogKind::IncomeMethod, &method_ids(&draft.lines)).await?;

    let removed = IncomeEntryLine::delete_many()
        .filter(income_entry_line::Column::EntryId.eq(entry_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let mut active: income_entry::ActiveModel = existing.into();
    active.date = Set(date);
    active.notes = Set(draft.notes.trim().to_string());
    let header = active
        .update(&txn)
        .await
        .map_err(|e| conflict_on_race(e, "income entry changed while it was being replaced"))?;

    insert_lines(&txn, entry_id, &draft.lines).await?;
    txn.commit().await?;

    debug!(
        "Replaced {} line(s) with {} on income entry {}",
        removed,
        draft.lines.len(),
        entry_id
    );
    Ok(models::IncomeEntry::from_parts(header, draft.lines.clone()))
}

/// Deletes an income entry together with its lines.
#[instrument(skip(db))]
pub async fn delete_income(db: &DatabaseConnection, entry_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    IncomeEntry::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("income entry", entry_id))?;

    IncomeEntryLine::delete_many()
        .filter(income_entry_line::Column::EntryId.eq(entry_id))
        .exec(&txn)
        .await?;
    let deleted = IncomeEntry::delete_by_id(entry_id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(Error::conflict(format!(
            "income entry {entry_id} was deleted concurrently"
        )));
    }

    txn.commit().await?;
    info!("Deleted income entry {}", entry_id);
    Ok(())
}

/// Records an income entry whose lines arrive packed as `"methodId:amount;..."`, the
/// shape produced by exports of the legacy portal. The text is decoded here, once, and
/// the entry is then created exactly like [`create_income`].
pub async fn import_legacy_income(
    db: &DatabaseConnection,
    date: &str,
    notes: &str,
    encoded_lines: &str,
    created_by: &str,
) -> Result<models::IncomeEntry> {
    let draft = IncomeDraft {
        date: date.to_string(),
        notes: notes.to_string(),
        lines: line_codec::decode_lines(encoded_lines)?,
    };
    create_income(db, &draft, created_by).await
}

/// Lists every expense entry, newest date first.
pub async fn list_expenses(db: &DatabaseConnection) -> Result<Vec<expense_entry::Model>> {
    query_expenses(db).await
}

/// Finds one expense entry.
pub async fn get_expense(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense_entry::Model>> {
    ExpenseEntry::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

struct ValidExpense {
    date: NaiveDate,
    vendor: String,
}

fn validate_expense(draft: &ExpenseDraft) -> Result<ValidExpense> {
    let date = calendar::parse_entry_date(&draft.date)?;
    validate_amount(draft.amount, "expense amount")?;
    let vendor = draft.vendor.trim();
    if vendor.is_empty() {
        return Err(Error::validation("expense vendor cannot be empty"));
    }
    Ok(ValidExpense {
        date,
        vendor: vendor.to_string(),
    })
}

async fn ensure_expense_references<C>(db: &C, draft: &ExpenseDraft) -> Result<()>
where
    C: ConnectionTrait,
{
    catalog::ensure_items_exist(db, CatalogKind::ExpenseType, &[draft.payment_type_id]).await?;
    catalog::ensure_items_exist(db, CatalogKind::ExpenseCategory, &[draft.category_id]).await
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records a new expense entry.
///
/// # Errors
/// Returns [`Error::Validation`] for a bad date, a negative or non-finite amount, a blank
/// vendor, or an unknown payment type / category id.
#[instrument(skip(db, draft), fields(date = %draft.date, amount = draft.amount))]
pub async fn create_expense(
    db: &DatabaseConnection,
    draft: &ExpenseDraft,
    created_by: &str,
) -> Result<expense_entry::Model> {
    let valid = validate_expense(draft)?;
    let txn = db.begin().await?;
    ensure_expense_references(&txn, draft).await?;

    let expense = expense_entry::ActiveModel {
        date: Set(valid.date),
        vendor: Set(valid.vendor),
        amount: Set(draft.amount),
        payment_type_id: Set(draft.payment_type_id),
        category_id: Set(draft.category_id),
        cheque_no: Set(non_blank(draft.cheque_no.as_ref())),
        reason: Set(non_blank(draft.reason.as_ref())),
        attachment: Set(draft.attachment.clone()),
        created_by: Set(created_by.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!("Recorded expense {} of {:.2} to '{}'", expense.id, expense.amount, expense.vendor);
    Ok(expense)
}

/// Replaces every editable field of an expense entry.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Conflict`] if the row
/// disappeared between lookup and update.
#[instrument(skip(db, draft), fields(date = %draft.date, amount = draft.amount))]
pub async fn replace_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    draft: &ExpenseDraft,
) -> Result<expense_entry::Model> {
    let valid = validate_expense(draft)?;
    let txn = db.begin().await?;
    let existing = ExpenseEntry::find_by_id(expense_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("expense entry", expense_id))?;
    ensure_expense_references(&txn, draft).await?;

    let mut active: expense_entry::ActiveModel = existing.into();
    active.date = Set(valid.date);
    active.vendor = Set(valid.vendor);
    active.amount = Set(draft.amount);
    active.payment_type_id = Set(draft.payment_type_id);
    active.category_id = Set(draft.category_id);
    active.cheque_no = Set(non_blank(draft.cheque_no.as_ref()));
    active.reason = Set(non_blank(draft.reason.as_ref()));
    active.attachment = Set(draft.attachment.clone());
    let updated = active
        .update(&txn)
        .await
        .map_err(|e| conflict_on_race(e, "expense entry changed while it was being replaced"))?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes an expense entry.
#[instrument(skip(db))]
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let deleted = ExpenseEntry::delete_by_id(expense_id).exec(db).await?;
    if deleted.rows_affected == 0 {
        return Err(Error::not_found("expense entry", expense_id));
    }
    info!("Deleted expense entry {}", expense_id);
    Ok(())
}

/// Whether an expense paid with `payment_type` is expected to carry a cheque number.
///
/// The rule matches the type's *name*, so renaming the "Cheque" type silently turns it off.
#[must_use]
pub fn requires_cheque_number(payment_type: &models::CatalogItem) -> bool {
    payment_type.name.trim().eq_ignore_ascii_case(CHEQUE_TYPE_NAME)
}

/// Presentation-side check for the cheque-number rule. The ledger itself does not
/// apply it when writing.
///
/// # Errors
/// Returns [`Error::Validation`] when a cheque payment has no cheque number.
pub fn check_cheque_number(payment_type: &models::CatalogItem, draft: &ExpenseDraft) -> Result<()> {
    if requires_cheque_number(payment_type) && non_blank(draft.cheque_no.as_ref()).is_none() {
        return Err(Error::validation(
            "cheque number is required for cheque payments",
        ));
    }
    Ok(())
}

/// Loads all income and expenses in list order for the aggregation functions, both
/// from the same transaction.
pub async fn load_ledger(db: &DatabaseConnection) -> Result<LedgerData> {
    let txn = db.begin().await?;
    let data = LedgerData {
        income: query_income(&txn).await?,
        expenses: query_expenses(&txn).await?,
    };
    txn.commit().await?;
    Ok(data)
}
