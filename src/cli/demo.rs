use chrono::{Datelike, Days, Local, Months, NaiveDate};

use crate::cli::{after_mutation, open_store};
use crate::error::Result;
use crate::models::{RecordDraft, RecordKind};
use crate::settings::{load_settings, save_settings};

const DEMO_MONTHS: u32 = 6;
const DEMO_BUDGET: f64 = 25000.0;

/// Fixed expenses generated every month.
struct RecurringRecord {
    day: u32,
    category: &'static str,
    note: &'static str,
    amount: f64,
}

const RECURRING: &[RecurringRecord] = &[
    RecurringRecord { day: 1, category: "housing", note: "rent", amount: 15000.0 },
    RecurringRecord { day: 2, category: "transport", note: "metro pass", amount: 1280.0 },
    RecurringRecord { day: 5, category: "utilities", note: "phone plan", amount: 499.0 },
    RecurringRecord { day: 5, category: "utilities", note: "internet", amount: 600.0 },
    RecurringRecord { day: 8, category: "food", note: "weekly groceries", amount: 2200.0 },
    RecurringRecord { day: 10, category: "entertainment", note: "streaming", amount: 390.0 },
];

/// One-off expenses rotated across months; each month picks three.
struct RotatingRecord {
    day: u32,
    category: &'static str,
    note: &'static str,
    amount: f64,
}

const ROTATING: &[RotatingRecord] = &[
    RotatingRecord { day: 12, category: "food", note: "dinner with friends", amount: 850.0 },
    RotatingRecord { day: 14, category: "shopping", note: "new shirt", amount: 990.0 },
    RotatingRecord { day: 16, category: "entertainment", note: "movie night", amount: 320.0 },
    RotatingRecord { day: 18, category: "transport", note: "taxi home", amount: 245.0 },
    RotatingRecord { day: 20, category: "shopping", note: "bookstore", amount: 680.0 },
    RotatingRecord { day: 22, category: "food", note: "night market", amount: 430.0 },
    RotatingRecord { day: 24, category: "other", note: "gift", amount: 1200.0 },
    RotatingRecord { day: 26, category: "entertainment", note: "concert ticket", amount: 1500.0 },
];

/// Base monthly salary; varied slightly by month index.
const SALARY_BASE: f64 = 45000.0;

/// Daily coffee runs leading up to today, so the streak challenge has
/// something to show.
const COFFEE_DAYS: u64 = 6;
const COFFEE_PRICE: f64 = 120.0;

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap())
        .pred_opt()
        .unwrap()
        .day();
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn expense(date: String, category: &str, note: &str, amount: f64) -> RecordDraft {
    RecordDraft {
        kind: RecordKind::Expense,
        amount,
        currency: crate::models::DEFAULT_CURRENCY.to_string(),
        category: category.to_string(),
        note: Some(note.to_string()),
        date,
        tags: vec!["demo".to_string()],
    }
}

/// Build six months of demo records ending at the current month.
fn generate_drafts() -> Vec<RecordDraft> {
    let today = Local::now().date_naive();
    let mut drafts = Vec::new();

    for i in 0..DEMO_MONTHS {
        let months_ago = DEMO_MONTHS - 1 - i;
        let target = today - Months::new(months_ago);
        let year = target.year();
        let month = target.month();
        let idx = i as usize;

        let salary = SALARY_BASE + (idx % 3) as f64 * 1500.0;
        drafts.push(RecordDraft {
            kind: RecordKind::Income,
            amount: salary,
            currency: crate::models::DEFAULT_CURRENCY.to_string(),
            category: "salary".to_string(),
            note: Some("monthly salary".to_string()),
            date: make_date(year, month, 1),
            tags: vec!["demo".to_string()],
        });

        for r in RECURRING {
            drafts.push(expense(make_date(year, month, r.day), r.category, r.note, r.amount));
        }

        for j in 0..3usize {
            let pick = (idx * 3 + j) % ROTATING.len();
            let rot = &ROTATING[pick];
            drafts.push(expense(make_date(year, month, rot.day), rot.category, rot.note, rot.amount));
        }
    }

    for offset in 0..COFFEE_DAYS {
        let day = today - Days::new(offset);
        drafts.push(expense(
            day.format("%Y-%m-%d").to_string(),
            "food",
            "morning coffee",
            COFFEE_PRICE,
        ));
    }

    drafts
}

pub fn run() -> Result<()> {
    let mut settings = load_settings();
    let store = open_store(&settings)?;

    // Only seed an empty ledger; never mix demo rows into real books.
    if !store.read_all()?.is_empty() {
        println!("Ledger already has records; demo data only loads into an empty ledger.");
        return Ok(());
    }

    let drafts = generate_drafts();
    let count = drafts.len();
    for draft in drafts {
        store.create(draft)?;
    }

    if settings.monthly_budget == 0.0 {
        settings.monthly_budget = DEMO_BUDGET;
        save_settings(&settings)?;
        println!("Set a demo monthly budget of {DEMO_BUDGET:.0}.");
    }

    println!("Demo data loaded!");
    println!("  Records:  {count}");
    println!("  Months:   {DEMO_MONTHS}");
    println!();
    println!("Try these next:");
    println!("  tally list");
    println!("  tally report");
    println!("  tally challenges list");
    println!("  tally ask \"where does my money go?\"");
    println!("  tally sync");

    after_mutation(&store, &settings)?;
    Ok(())
}
