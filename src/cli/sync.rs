use std::time::Instant;

use colored::Colorize;

use crate::cli::open_store;
use crate::error::Result;
use crate::models::SyncStatus;
use crate::settings::load_settings;
use crate::sync::{HttpTransport, SyncEngine, SyncTrigger};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let Some(endpoint) = settings.sync_endpoint() else {
        println!("Sync endpoint not configured; the ledger is offline.");
        println!("Set sync_endpoint in settings.json or TALLY_SYNC_ENDPOINT to enable sync.");
        return Ok(());
    };

    let pending = store.list_dirty()?.len();
    println!("Syncing {pending} pending record(s) with {endpoint}");

    let transport = HttpTransport::new(&endpoint)?;
    let mut engine = SyncEngine::new(Some(transport), store.last_synced_at()?);
    engine.request_sync(&store, SyncTrigger::Manual, Instant::now());

    let snapshot = engine.snapshot();
    match snapshot.status {
        SyncStatus::Success => {
            println!("{} {} record(s) in the ledger.", "Sync complete.".green(), store.list()?.len());
            if let Some(at) = &snapshot.last_synced_at {
                println!("Last synced: {at}");
            }
        }
        SyncStatus::Error => {
            eprintln!(
                "{} {}",
                "Sync failed:".red(),
                snapshot.error.as_deref().unwrap_or("unknown error")
            );
            std::process::exit(1);
        }
        _ => {}
    }
    Ok(())
}
