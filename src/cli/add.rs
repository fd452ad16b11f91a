use chrono::Local;
use colored::Colorize;

use crate::cli::{after_mutation, open_store, short_id};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::models::{RecordDraft, RecordKind};
use crate::settings::load_settings;

pub fn run(
    amount: f64,
    category: &str,
    kind: &str,
    note: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
    currency: Option<String>,
) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let kind = RecordKind::parse(kind)
        .ok_or_else(|| TallyError::Validation("type must be expense or income".to_string()))?;
    let draft = RecordDraft {
        kind,
        amount,
        currency: currency.unwrap_or_else(|| settings.currency.clone()),
        category: category.to_string(),
        note,
        date: date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
        tags,
    };
    let record = store.create(draft)?;

    let amount_str = match record.kind {
        RecordKind::Expense => money(record.amount, &record.currency).red().to_string(),
        RecordKind::Income => money(record.amount, &record.currency).green().to_string(),
    };
    println!(
        "Added {} {} in {} on {} ({})",
        record.kind.as_str(),
        amount_str,
        record.category,
        record.date,
        short_id(&record.id)
    );

    after_mutation(&store, &settings)?;
    Ok(())
}
