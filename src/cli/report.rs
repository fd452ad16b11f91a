use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::challenge;
use crate::cli::{filter_month, open_store};
use crate::error::Result;
use crate::fmt::{bar, money};
use crate::reports;
use crate::settings::load_settings;

pub fn run(month: Option<String>) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let records = store.list()?;

    if records.is_empty() {
        println!("No records to report on yet. Add one with `tally add`.");
        return Ok(());
    }
    let currency = &settings.currency;

    let series = reports::monthly_series(&records);
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for entry in &series {
        let net = entry.net();
        let net_str = if net >= 0.0 {
            money(net, currency).green().to_string()
        } else {
            money(net, currency).red().to_string()
        };
        table.add_row(vec![
            Cell::new(&entry.month),
            Cell::new(money(entry.income, currency)),
            Cell::new(money(entry.expense, currency)),
            Cell::new(net_str),
        ]);
    }
    println!("Monthly Totals\n{table}");

    let month = month.unwrap_or_else(|| Local::now().format("%Y-%m").to_string());
    let month_records = filter_month(records.clone(), &month);
    let totals = reports::category_totals(&month_records);
    if totals.is_empty() {
        println!("\nNo spending recorded in {month}.");
    } else {
        let total: f64 = totals.iter().map(|c| c.total).sum();
        let mut ctable = Table::new();
        ctable.set_header(vec!["Category", "Amount", "%"]);
        for item in &totals {
            ctable.add_row(vec![
                Cell::new(&item.category),
                Cell::new(money(item.total, currency)),
                Cell::new(format!("{:.1}%", item.total / total * 100.0)),
            ]);
        }
        ctable.add_row(vec![
            Cell::new("Total".bold()),
            Cell::new(money(total, currency)),
            Cell::new(""),
        ]);
        println!("\nSpending by Category ({month})\n{ctable}");
    }

    let today = Local::now().date_naive();
    if settings.monthly_budget > 0.0 {
        let progress = reports::budget_progress(&records, settings.monthly_budget, today);
        let gauge = bar(progress.ratio, 20);
        let line = format!(
            "Budget: {} / {}  [{gauge}] {:.0}%",
            money(progress.spent, currency),
            money(progress.budget, currency),
            progress.ratio * 100.0
        );
        if progress.ratio >= 1.0 {
            println!("\n{}", line.red());
        } else {
            println!("\n{line}");
        }
        println!("Remaining this month: {}", money(progress.remaining, currency));
    }

    let streak = challenge::daily_streak(&records, today);
    println!("\nLogging streak: {streak} day(s)");

    Ok(())
}
