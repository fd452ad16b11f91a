use crate::cli::{after_mutation, open_store, short_id};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(id: &str) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let resolved = store.resolve_id(id)?;
    store.soft_delete(&resolved)?;
    println!("Removed record {}", short_id(&resolved));

    after_mutation(&store, &settings)?;
    Ok(())
}
