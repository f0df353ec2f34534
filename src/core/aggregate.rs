//! Aggregation functions - Dashboard and report figures computed from loaded ledger data.
//!
//! Everything here is pure: the functions take a [`LedgerData`] (or slices of it) and
//! never touch the database. Amounts are accumulated in the slice order of the input,
//! so aggregating the same data twice yields bit-identical results.
//!
//! Dates are calendar-day keys compared for equality; no time zone is applied.

use crate::{
    core::calendar,
    models::{CatalogItem, ExpenseEntry, IncomeEntry, LedgerData},
};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Bucket for expenses whose category id is not in the catalog
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Income and expense totals for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DailyTotal {
    /// Sum of all income lines dated that day
    pub income: f64,
    /// Sum of all expenses dated that day
    pub expense: f64,
}

/// Income, expenses and profit for a month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MonthStats {
    /// Total income
    pub income: f64,
    /// Total expenses
    pub expenses: f64,
    /// `income - expenses`
    pub profit: f64,
}

impl MonthStats {
    fn new(income: f64, expenses: f64) -> Self {
        Self {
            income,
            expenses,
            profit: income - expenses,
        }
    }
}

/// One point of a rolling daily series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DailyPoint {
    /// Calendar day
    pub date: NaiveDate,
    /// Income that day
    pub income: f64,
    /// Expenses that day
    pub expense: f64,
}

/// One row of the month-by-month report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    /// Total income
    pub income: f64,
    /// Total expenses
    pub expenses: f64,
    /// `income - expenses`
    pub profit: f64,
}

fn sum_income<'a>(entries: impl Iterator<Item = &'a IncomeEntry>) -> f64 {
    entries.fold(0.0, |acc, entry| acc + entry.total())
}

fn sum_expenses<'a>(entries: impl Iterator<Item = &'a ExpenseEntry>) -> f64 {
    entries.fold(0.0, |acc, expense| acc + expense.amount)
}

/// Totals for exactly one calendar day.
#[must_use]
pub fn daily_total(data: &LedgerData, date: NaiveDate) -> DailyTotal {
    DailyTotal {
        income: sum_income(data.income.iter().filter(|e| e.date == date)),
        expense: sum_expenses(data.expenses.iter().filter(|e| e.date == date)),
    }
}

/// Stats for the whole calendar month containing `reference`. A month without entries
/// yields all zeros.
#[must_use]
pub fn month_to_date_stats(data: &LedgerData, reference: NaiveDate) -> MonthStats {
    let income = sum_income(
        data.income
            .iter()
            .filter(|e| calendar::same_month(e.date, reference)),
    );
    let expenses = sum_expenses(
        data.expenses
            .iter()
            .filter(|e| calendar::same_month(e.date, reference)),
    );
    MonthStats::new(income, expenses)
}

/// Exactly `days` consecutive dates ending at `reference`, oldest first. Days without
/// activity are present with zero totals; entries outside the window are ignored.
#[must_use]
pub fn rolling_series(data: &LedgerData, days: usize, reference: NaiveDate) -> Vec<DailyPoint> {
    let mut series: Vec<DailyPoint> = (0..days as u64)
        .rev()
        .filter_map(|offset| reference.checked_sub_days(Days::new(offset)))
        .map(|date| DailyPoint {
            date,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    let index: HashMap<NaiveDate, usize> = series
        .iter()
        .enumerate()
        .map(|(i, point)| (point.date, i))
        .collect();

    for entry in &data.income {
        if let Some(&i) = index.get(&entry.date) {
            series[i].income += entry.total();
        }
    }
    for expense in &data.expenses {
        if let Some(&i) = index.get(&expense.date) {
            series[i].expense += expense.amount;
        }
    }
    series
}

/// Expense totals per category name. Ids missing from `categories` land in
/// [`UNKNOWN_CATEGORY`]; categories sharing a name share a bucket.
#[must_use]
pub fn category_breakdown(
    expenses: &[ExpenseEntry],
    categories: &[CatalogItem],
) -> BTreeMap<String, f64> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut breakdown = BTreeMap::new();
    for expense in expenses {
        let name = names
            .get(&expense.category_id)
            .copied()
            .unwrap_or(UNKNOWN_CATEGORY);
        *breakdown.entry(name.to_string()).or_insert(0.0) += expense.amount;
    }
    breakdown
}

/// Income, expenses and profit per month that has any activity, newest month first.
#[must_use]
pub fn monthly_summary(data: &LedgerData) -> Vec<MonthSummary> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for entry in &data.income {
        months.entry(calendar::month_key(entry.date)).or_default().0 += entry.total();
    }
    for expense in &data.expenses {
        months.entry(calendar::month_key(expense.date)).or_default().1 += expense.amount;
    }

    months
        .into_iter()
        .rev()
        .map(|(month, (income, expenses))| MonthSummary {
            month,
            income,
            expenses,
            profit: income - expenses,
        })
        .collect()
}

/// The first `n` income entries in list order (the most recent when `data` came
/// from the ledger).
#[must_use]
pub fn recent_income(data: &LedgerData, n: usize) -> &[IncomeEntry] {
    &data.income[..n.min(data.income.len())]
}

/// The entries of the month containing `month`, keeping list order.
#[must_use]
pub fn entries_in_month(data: &LedgerData, month: NaiveDate) -> LedgerData {
    LedgerData {
        income: data
            .income
            .iter()
            .filter(|e| calendar::same_month(e.date, month))
            .cloned()
            .collect(),
        expenses: data
            .expenses
            .iter()
            .filter(|e| calendar::same_month(e.date, month))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::CatalogKind;
    use crate::models::IncomeLine;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income(id: i64, date: NaiveDate, amounts: &[(i64, f64)]) -> IncomeEntry {
        IncomeEntry {
            id,
            date,
            notes: String::new(),
            created_by: "admin".to_string(),
            lines: amounts
                .iter()
                .map(|&(method_id, amount)| IncomeLine { method_id, amount })
                .collect(),
        }
    }

    fn expense(id: i64, date: NaiveDate, amount: f64, category_id: i64) -> ExpenseEntry {
        ExpenseEntry {
            id,
            date,
            vendor: "Vendor".to_string(),
            amount,
            payment_type_id: 1,
            category_id,
            cheque_no: None,
            reason: None,
            attachment: None,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
        }
    }

    fn category(id: i64, name: &str) -> CatalogItem {
        CatalogItem {
            id,
            kind: CatalogKind::ExpenseCategory,
            name: name.to_string(),
            is_active: true,
            sort_order: 999,
        }
    }

    fn sample() -> LedgerData {
        LedgerData {
            income: vec![
                income(3, ymd(2024, 4, 2), &[(1, 20.0)]),
                income(2, ymd(2024, 3, 15), &[(1, 30.0), (3, 5.0)]),
                income(1, ymd(2024, 3, 1), &[(1, 100.0), (2, 50.0)]),
            ],
            expenses: vec![
                expense(2, ymd(2024, 3, 20), 12.5, 10),
                expense(1, ymd(2024, 3, 5), 40.0, 11),
            ],
        }
    }

    #[test]
    fn test_daily_total_sums_every_line() {
        let data = LedgerData {
            income: vec![income(1, ymd(2024, 3, 1), &[(1, 100.0), (2, 50.0)])],
            expenses: Vec::new(),
        };
        assert_eq!(
            daily_total(&data, ymd(2024, 3, 1)),
            DailyTotal {
                income: 150.0,
                expense: 0.0
            }
        );
        assert_eq!(daily_total(&data, ymd(2024, 3, 2)), DailyTotal::default());
    }

    #[test]
    fn test_empty_month_yields_zero_stats() {
        let stats = month_to_date_stats(&sample(), ymd(2023, 12, 31));
        assert_eq!(stats, MonthStats::default());

        let empty = month_to_date_stats(&LedgerData::default(), ymd(2024, 3, 1));
        assert_eq!(empty.profit, 0.0);
    }

    #[test]
    fn test_month_stats_compute_profit() {
        let stats = month_to_date_stats(&sample(), ymd(2024, 3, 10));
        assert_eq!(stats.income, 185.0);
        assert_eq!(stats.expenses, 52.5);
        assert_eq!(stats.profit, 132.5);
    }

    #[test]
    fn test_rolling_series_has_every_day_once() {
        let reference = ymd(2024, 3, 10);
        let series = rolling_series(&sample(), 30, reference);

        assert_eq!(series.len(), 30);
        assert_eq!(series.last().unwrap().date, reference);
        assert_eq!(series[0].date, ymd(2024, 2, 10));
        for pair in series.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }

        let march_first = series.iter().find(|p| p.date == ymd(2024, 3, 1)).unwrap();
        assert_eq!(march_first.income, 150.0);
        let march_fifth = series.iter().find(|p| p.date == ymd(2024, 3, 5)).unwrap();
        assert_eq!(march_fifth.expense, 40.0);

        assert_eq!(rolling_series(&LedgerData::default(), 30, reference).len(), 30);
        assert!(rolling_series(&sample(), 0, reference).is_empty());
    }

    #[test]
    fn test_rolling_series_agrees_with_month_stats() {
        // A 30-day window ending on April 30th covers exactly April
        let data = sample();
        let series = rolling_series(&data, 30, ymd(2024, 4, 30));
        let stats = month_to_date_stats(&data, ymd(2024, 4, 30));

        let income = series.iter().fold(0.0, |acc, p| acc + p.income);
        let expense = series.iter().fold(0.0, |acc, p| acc + p.expense);
        assert_eq!(income, stats.income);
        assert_eq!(expense, stats.expenses);
    }

    #[test]
    fn test_aggregates_match_line_sums() {
        let data = sample();
        let line_sum = data
            .income
            .iter()
            .flat_map(|e| e.lines.iter())
            .fold(0.0, |acc, line| acc + line.amount);
        let summary_sum = monthly_summary(&data)
            .iter()
            .fold(0.0, |acc, m| acc + m.income);
        assert_eq!(line_sum, summary_sum);
    }

    #[test]
    fn test_unknown_category_goes_to_unknown_bucket() {
        let expenses = vec![expense(1, ymd(2024, 3, 5), 40.0, 999)];
        let breakdown = category_breakdown(&expenses, &[category(10, "Supplies")]);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[UNKNOWN_CATEGORY], 40.0);
    }

    #[test]
    fn test_category_breakdown_by_name() {
        let data = sample();
        let breakdown = category_breakdown(
            &data.expenses,
            &[category(10, "Supplies"), category(11, "Rent")],
        );
        assert_eq!(breakdown["Supplies"], 12.5);
        assert_eq!(breakdown["Rent"], 40.0);
        assert!(!breakdown.contains_key(UNKNOWN_CATEGORY));
    }

    #[test]
    fn test_monthly_summary_newest_first() {
        let summary = monthly_summary(&sample());
        let months: Vec<&str> = summary.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-04", "2024-03"]);
        assert_eq!(summary[1].profit, 132.5);
    }

    #[test]
    fn test_recent_income_and_month_filter() {
        let data = sample();
        assert_eq!(recent_income(&data, 2).len(), 2);
        assert_eq!(recent_income(&data, 2)[0].id, 3);
        assert_eq!(recent_income(&data, 10).len(), 3);

        let march = entries_in_month(&data, ymd(2024, 3, 1));
        assert_eq!(march.income.len(), 2);
        assert_eq!(march.expenses.len(), 2);
        assert_eq!(march.income[0].id, 2);
    }

    #[test]
    fn test_repeated_aggregation_is_bit_identical() {
        let data = sample();
        let first = month_to_date_stats(&data, ymd(2024, 3, 1));
        let second = month_to_date_stats(&data, ymd(2024, 3, 1));
        assert_eq!(first.income.to_bits(), second.income.to_bits());
        assert_eq!(first.profit.to_bits(), second.profit.to_bits());
    }
}
