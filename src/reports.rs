use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{LedgerRecord, RecordKind};

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

pub struct MonthlyTotal {
    pub month: String,
    pub expense: f64,
    pub income: f64,
}

impl MonthlyTotal {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Expense/income totals per month, oldest month first. Months are keyed by
/// the record's business date.
pub fn monthly_series(records: &[LedgerRecord]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for record in records {
        let Some(month) = record.date.get(0..7) else {
            continue;
        };
        let entry = months.entry(month.to_string()).or_insert((0.0, 0.0));
        match record.kind {
            RecordKind::Expense => entry.0 += record.amount,
            RecordKind::Income => entry.1 += record.amount,
        }
    }
    months
        .into_iter()
        .map(|(month, (expense, income))| MonthlyTotal { month, expense, income })
        .collect()
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expense totals per category, biggest spender first.
pub fn category_totals(records: &[LedgerRecord]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.kind == RecordKind::Expense) {
        *totals.entry(record.category.as_str()).or_insert(0.0) += record.amount;
    }
    let mut list: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category: category.to_string(), total })
        .collect();
    list.sort_by(|a, b| b.total.total_cmp(&a.total));
    list
}

pub fn top_category(records: &[LedgerRecord]) -> Option<CategoryTotal> {
    category_totals(records).into_iter().next()
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

pub struct BudgetProgress {
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    /// Spent over budget, clamped to [0, 1]. Zero when no budget is set.
    pub ratio: f64,
}

pub fn budget_progress(records: &[LedgerRecord], budget: f64, today: NaiveDate) -> BudgetProgress {
    let spent = crate::challenge::monthly_spending(records, today);
    let remaining = (budget - spent).max(0.0);
    let ratio = if budget > 0.0 { (spent / budget).min(1.0) } else { 0.0 };
    BudgetProgress { budget, spent, remaining, ratio }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

const CSV_HEADER: &[&str] = &[
    "id", "type", "amount", "currency", "category", "note", "date", "tags", "created_at",
    "updated_at",
];

/// Write the visible record list as CSV. Tags are joined with `|` so the
/// file stays one row per record.
pub fn write_csv<W: std::io::Write>(records: &[LedgerRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for record in records {
        let amount = record.amount.to_string();
        let tags = record.tags.join("|");
        csv_writer.write_record([
            record.id.as_str(),
            record.kind.as_str(),
            amount.as_str(),
            record.currency.as_str(),
            record.category.as_str(),
            record.note.as_deref().unwrap_or(""),
            record.date.as_str(),
            tags.as_str(),
            record.created_at.as_str(),
            record.updated_at.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
