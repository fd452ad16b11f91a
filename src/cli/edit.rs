use crate::cli::{after_mutation, open_store, short_id};
use crate::error::{Result, TallyError};
use crate::models::{RecordKind, RecordPatch};
use crate::settings::load_settings;

pub fn run(
    id: &str,
    amount: Option<f64>,
    category: Option<String>,
    kind: Option<String>,
    note: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
    currency: Option<String>,
) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let kind = match kind {
        Some(value) => Some(RecordKind::parse(&value).ok_or_else(|| {
            TallyError::Validation("type must be expense or income".to_string())
        })?),
        None => None,
    };
    let patch = RecordPatch {
        kind,
        amount,
        category,
        note,
        date,
        tags: if tags.is_empty() { None } else { Some(tags) },
        currency,
    };

    let resolved = store.resolve_id(id)?;
    let record = store.update(&resolved, patch)?;
    println!("Updated record {}", short_id(&record.id));

    after_mutation(&store, &settings)?;
    Ok(())
}
