pub mod add;
pub mod ask;
pub mod challenges;
pub mod completions;
pub mod demo;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod plan;
pub mod remove;
pub mod report;
pub mod reset;
pub mod status;
pub mod sync;

use std::time::Instant;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use crate::error::Result;
use crate::models::LedgerRecord;
use crate::settings::Settings;
use crate::store::RecordStore;
use crate::sync::{HttpTransport, SyncEngine, SyncTrigger};

/// Open the ledger database, or bail with a pointer to `init`.
pub(crate) fn open_store(settings: &Settings) -> Result<RecordStore> {
    let db_path = settings.db_path();
    if !db_path.exists() {
        eprintln!("No database found. Run `tally init` first.");
        std::process::exit(1);
    }
    RecordStore::open(&db_path)
}

/// Run the debounced sync that a mutation arms, when auto sync is on. A
/// failed cycle only warns; the local write has already landed.
pub(crate) fn after_mutation(store: &RecordStore, settings: &Settings) -> Result<()> {
    if !settings.auto_sync {
        return Ok(());
    }
    let Some(endpoint) = settings.sync_endpoint() else {
        return Ok(());
    };
    let transport = HttpTransport::new(&endpoint)?;
    let mut engine = SyncEngine::new(Some(transport), store.last_synced_at()?);
    engine.request_sync(store, SyncTrigger::Mutation, Instant::now());
    engine.drain(store);

    if let Some(error) = &engine.snapshot().error {
        eprintln!("{} {error}", "Sync failed:".yellow());
    }
    Ok(())
}

/// Keep records whose business date falls in a `YYYY-MM` month.
pub(crate) fn filter_month(records: Vec<LedgerRecord>, month: &str) -> Vec<LedgerRecord> {
    records
        .into_iter()
        .filter(|r| r.date.starts_with(month))
        .collect()
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(0..8).unwrap_or(id)
}

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Local-first budget ledger with remote sync.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Add an expense or income record.
    Add {
        /// Amount in ledger currency
        amount: f64,
        /// Category, e.g. food, transport, salary
        #[arg(long)]
        category: String,
        /// Record type: expense or income
        #[arg(long = "type", default_value = "expense")]
        kind: String,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
        /// Business date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Tag to attach; repeat for multiple tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Override the configured currency for this record
        #[arg(long)]
        currency: Option<String>,
    },
    /// Edit an existing record by id (a unique prefix is enough).
    Edit {
        /// Record id or unique prefix
        id: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        /// New record type: expense or income
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// New business date: YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Replacement tags; repeat for multiple
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete a record (kept as a tombstone until it syncs).
    Remove {
        /// Record id or unique prefix
        id: String,
    },
    /// List records.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Category filter
        #[arg(long)]
        category: Option<String>,
        /// Include deleted records
        #[arg(long)]
        all: bool,
    },
    /// Push local changes and pull the remote ledger.
    Sync,
    /// Show configuration, ledger counts and sync state.
    Status,
    /// Monthly totals, category breakdown and budget progress.
    Report {
        /// Month for the category breakdown: YYYY-MM (default: current)
        #[arg(long)]
        month: Option<String>,
    },
    /// Track saving challenges.
    Challenges {
        #[command(subcommand)]
        command: ChallengesCommands,
    },
    /// Show or change the subscription plan.
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Ask the assistant about your spending.
    Ask {
        /// The question to ask
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
    },
    /// Export the ledger as CSV.
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Load a deterministic sample ledger to explore tally.
    Demo,
    /// Wipe all ledger records, tombstones included.
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ChallengesCommands {
    /// Show progress for built-in and custom challenges.
    List,
    /// Add a custom challenge.
    Add {
        /// Challenge title
        title: String,
        /// Target value (days, record count, or spending cap)
        #[arg(long)]
        target: f64,
        /// Challenge type: streak, count, amount
        #[arg(long = "type", default_value = "amount")]
        kind: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a custom challenge by id.
    Remove {
        /// Challenge id (shown in `tally challenges list`)
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the current plan and today's assistant usage.
    Show,
    /// Set the plan locally: free, pro, enterprise.
    Set {
        /// Plan tier
        tier: String,
    },
    /// Start a checkout and print the payment URL.
    Upgrade {
        /// Plan tier to buy: pro or enterprise
        #[arg(long, default_value = "pro")]
        tier: String,
        /// Billing cycle: monthly or annual
        #[arg(long, default_value = "monthly")]
        cycle: String,
    },
    /// Print the customer portal URL for an existing subscription.
    Portal,
}
