use std::path::Path;

use crate::cli::open_store;
use crate::error::Result;
use crate::reports;
use crate::settings::load_settings;

pub fn run(output: Option<String>) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;
    let records = store.list()?;

    match output {
        Some(path) => {
            let file = std::fs::File::create(Path::new(&path))?;
            reports::write_csv(&records, file)?;
            println!("Exported {} record(s) to {path}", records.len());
        }
        None => {
            reports::write_csv(&records, std::io::stdout())?;
        }
    }
    Ok(())
}
