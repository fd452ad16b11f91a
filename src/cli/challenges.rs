use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use crate::challenge;
use crate::cli::open_store;
use crate::error::{Result, TallyError};
use crate::models::{ChallengeDefinition, ChallengeKind};
use crate::settings::load_settings;

pub fn list() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let records = store.list()?;
    let custom = store.custom_challenges()?;
    let today = Local::now().date_naive();
    let progress = challenge::evaluate(&records, &custom, today);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Challenge", "Progress", "Status"]);
    for item in &progress {
        let gauge = format!(
            "[{}] {:.0}%",
            crate::fmt::bar(item.progress, 10),
            item.progress * 100.0
        );
        let status = if item.achieved {
            "done".green().to_string()
        } else {
            item.metric_label.clone()
        };
        table.add_row(vec![
            Cell::new(&item.definition.id),
            Cell::new(&item.definition.title),
            Cell::new(gauge),
            Cell::new(status),
        ]);
    }
    println!("Challenges\n{table}");
    Ok(())
}

pub fn add(title: &str, target: f64, kind: &str, description: Option<String>) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let kind = ChallengeKind::parse(kind).ok_or_else(|| {
        TallyError::Validation("type must be streak, count or amount".to_string())
    })?;
    if !target.is_finite() || target <= 0.0 {
        return Err(TallyError::Validation("target must be greater than zero".to_string()));
    }

    let description = description.unwrap_or_else(|| match kind {
        ChallengeKind::Streak => format!("Log records {target:.0} days in a row"),
        ChallengeKind::Count => format!("Log {target:.0} records this month"),
        ChallengeKind::Amount => format!("Keep monthly spending under {target:.0}"),
    });
    let id = format!("custom-{}", &Uuid::new_v4().to_string()[..8]);
    let definition = ChallengeDefinition {
        id: id.clone(),
        title: title.to_string(),
        description,
        target,
        kind,
    };
    store.add_custom_challenge(definition)?;

    println!("Added challenge {id}: {title}");
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    if store.remove_custom_challenge(id)? {
        println!("Removed challenge {id}");
        Ok(())
    } else {
        Err(TallyError::Other(format!("No custom challenge with id '{id}'")))
    }
}
