mod ai;
mod billing;
mod challenge;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod reports;
mod settings;
mod store;
mod sync;
#[cfg(test)]
mod testutil;

use clap::Parser;

use cli::{ChallengesCommands, Cli, Commands, PlanCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            amount,
            category,
            kind,
            note,
            date,
            tags,
            currency,
        } => cli::add::run(amount, &category, &kind, note, date, tags, currency),
        Commands::Edit {
            id,
            amount,
            category,
            kind,
            note,
            date,
            tags,
            currency,
        } => cli::edit::run(&id, amount, category, kind, note, date, tags, currency),
        Commands::Remove { id } => cli::remove::run(&id),
        Commands::List {
            month,
            category,
            all,
        } => cli::list::run(month, category, all),
        Commands::Sync => cli::sync::run(),
        Commands::Status => cli::status::run(),
        Commands::Report { month } => cli::report::run(month),
        Commands::Challenges { command } => match command {
            ChallengesCommands::List => cli::challenges::list(),
            ChallengesCommands::Add {
                title,
                target,
                kind,
                description,
            } => cli::challenges::add(&title, target, &kind, description),
            ChallengesCommands::Remove { id } => cli::challenges::remove(&id),
        },
        Commands::Plan { command } => match command {
            PlanCommands::Show => cli::plan::show(),
            PlanCommands::Set { tier } => cli::plan::set(&tier),
            PlanCommands::Upgrade { tier, cycle } => cli::plan::upgrade(&tier, &cycle),
            PlanCommands::Portal => cli::plan::portal(),
        },
        Commands::Ask { question } => cli::ask::run(&question),
        Commands::Export { output } => cli::export::run(output),
        Commands::Demo => cli::demo::run(),
        Commands::Reset { force } => cli::reset::run(force),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
