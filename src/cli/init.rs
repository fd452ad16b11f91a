use std::path::PathBuf;

use uuid::Uuid;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::store::RecordStore;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if settings.user_id.is_empty() {
        settings.user_id = Uuid::new_v4().to_string();
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    RecordStore::open(&settings.db_path())?;

    println!("Initialized tally at {}", resolved.display());
    if settings.sync_endpoint().is_none() {
        println!("No sync endpoint configured; the ledger stays local.");
        println!("Set sync_endpoint in settings.json or TALLY_SYNC_ENDPOINT to enable sync.");
    }
    Ok(())
}
