use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{filter_month, open_store, short_id};
use crate::error::Result;
use crate::fmt::money;
use crate::models::RecordKind;
use crate::settings::load_settings;

pub fn run(month: Option<String>, category: Option<String>, all: bool) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let mut records = if all { store.read_all()? } else { store.list()? };
    if let Some(month) = &month {
        records = filter_month(records, month);
    }
    if let Some(category) = &category {
        records.retain(|r| r.category == *category);
    }

    if records.is_empty() {
        println!("No records. Add one with `tally add`.");
        return Ok(());
    }

    let any_dirty = records.iter().any(|r| r.dirty);
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Amount", "Category", "Note", "Tags"]);
    for record in &records {
        let amount = match record.kind {
            RecordKind::Expense => money(record.amount, &record.currency).red().to_string(),
            RecordKind::Income => money(record.amount, &record.currency).green().to_string(),
        };
        let id = if record.dirty {
            format!("{}*", short_id(&record.id))
        } else {
            short_id(&record.id).to_string()
        };
        let kind = if record.deleted {
            format!("{} (deleted)", record.kind.as_str())
        } else {
            record.kind.as_str().to_string()
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(&record.date),
            Cell::new(kind),
            Cell::new(amount),
            Cell::new(&record.category),
            Cell::new(record.note.as_deref().unwrap_or("")),
            Cell::new(record.tags.join(", ")),
        ]);
    }

    println!("Records\n{table}");
    println!("{} record(s)", records.len());
    if any_dirty {
        println!("* not yet synced");
    }
    Ok(())
}
