use chrono::Local;
use colored::Colorize;

use crate::ai;
use crate::cli::open_store;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(question: &[String]) -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings)?;

    let question = question.join(" ");
    let today = Local::now().date_naive();
    let answer = ai::ask(
        &store,
        settings.ai_endpoint().as_deref(),
        &settings.currency,
        &question,
        today,
    )?;

    println!("{}", answer.reply);
    if answer.used_fallback {
        println!("{}", "(offline analysis)".dimmed());
    }

    let date_key = today.format("%Y-%m-%d").to_string();
    let remaining = ai::remaining_quota(&store, &date_key)?;
    println!("{}", format!("Questions left today: {remaining}").dimmed());
    Ok(())
}
