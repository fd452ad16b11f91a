use chrono::Local;

use crate::ai;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::load_settings;
use crate::store::RecordStore;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:     {}", settings.data_dir);
    println!("Database:     {}", db_path.display());
    println!("Currency:     {}", settings.currency);
    if settings.monthly_budget > 0.0 {
        println!("Budget:       {} per month", money(settings.monthly_budget, &settings.currency));
    } else {
        println!("Budget:       (not set)");
    }
    match settings.sync_endpoint() {
        Some(endpoint) => println!("Sync:         {endpoint}"),
        None => println!("Sync:         (not configured, ledger is offline)"),
    }
    println!("Auto sync:    {}", if settings.auto_sync { "on" } else { "off" });

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `tally init` to set up.");
        return Ok(());
    }

    let store = RecordStore::open(&db_path)?;
    let plan = store.plan()?;
    let visible = store.list()?.len();
    let all = store.read_all()?;
    let pending = store.list_dirty()?.len();
    let deleted = all.iter().filter(|r| r.deleted).count();
    let custom = store.custom_challenges()?.len();

    let today = Local::now().format("%Y-%m-%d").to_string();
    let remaining = ai::remaining_quota(&store, &today)?;
    let limit = plan.daily_ai_limit();

    println!("Plan:         {}", plan.label());
    match store.last_synced_at()? {
        Some(at) => println!("Last synced:  {at}"),
        None => println!("Last synced:  never"),
    }
    println!();
    println!("Records:      {visible}");
    println!("Pending:      {pending}");
    println!("Deleted:      {deleted}");
    println!("Challenges:   {} custom", custom);
    println!("Assistant:    {}/{} questions left today", remaining, limit);

    Ok(())
}
