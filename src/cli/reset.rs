use crate::cli::open_store;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(force: bool) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    if !force {
        eprintln!("This wipes every ledger record, tombstones included. Re-run with --force to confirm.");
        std::process::exit(1);
    }

    store.purge_all()?;
    println!("Ledger reset. The next sync starts from a clean slate.");
    Ok(())
}
