mod commands;
mod logging;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use mediamerge_core::metadata::{ExifToolReader, ExifToolWriter};
use mediamerge_core::similarity::ImageFrameDecoder;
use mediamerge_core::storage::Database;
use mediamerge_core::{ReconcileEngine, RunSummary};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match mediamerge_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Index) => {
            if let Err(err) = with_engine(&config, |engine| {
                let indexed = engine.index_library()?;
                info!("{} library files indexed", format!("{}", indexed).green());
                Ok(())
            }) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Detect) => {
            if let Err(err) = with_engine(&config, |engine| {
                let backup_roots = mediamerge_core::config::non_overlapping_directories(
                    config.backup_roots.clone(),
                );
                for root in &backup_roots {
                    let (duplicates, links) = engine.detect_duplicates(Path::new(root))?;
                    info!(
                        "{}: {} duplicates, {} match links",
                        root,
                        format!("{}", duplicates).red(),
                        format!("{}", links).red(),
                    );
                }
                Ok(())
            }) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Reconcile) => {
            if let Err(err) = with_engine(&config, |engine| {
                let (staged, completed) = engine.reconcile()?;
                info!(
                    "{} copies staged, {} matches completed",
                    format!("{}", staged).green(),
                    format!("{}", completed).green(),
                );
                Ok(())
            }) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Run) => {
            if let Err(err) = with_engine(&config, |engine| {
                let summary = engine.run()?;
                print_summary(&summary);
                Ok(())
            }) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        Some(Commands::TruncateDb) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the Database?",
                Some(false),
            ) {
                Ok(true) => match Database::open(&config.db_path) {
                    Ok(db) => {
                        if let Err(err) = db.truncate_all() {
                            error!("Error truncating database: {}", err);
                        } else {
                            println!("All tables truncated");
                        }
                    }
                    Err(err) => error!("Error opening database: {}", err),
                },
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn with_engine(
    config: &mediamerge_core::AppConfig,
    run: impl FnOnce(&ReconcileEngine) -> Result<(), mediamerge_core::Error>,
) -> Result<(), mediamerge_core::Error> {
    let db = Database::open(&config.db_path)?;
    let decoder = ImageFrameDecoder;
    let reader = ExifToolReader;
    let writer = ExifToolWriter;
    let engine = ReconcileEngine::new(config, &db, &decoder, &reader, &writer)?;
    run(&engine)
}

fn print_summary(summary: &RunSummary) {
    println!();
    info!(
        "Index: {}, Detect: {}, Reconcile: {}",
        format!("{:.2}s", summary.index_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.detect_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.reconcile_duration.as_secs_f64()).green(),
    );
    info!(
        "{} originals indexed, {} duplicates recorded, {} match links",
        format!("{}", summary.originals_indexed).cyan(),
        format!("{}", summary.duplicates_recorded).red(),
        format!("{}", summary.links_recorded).red(),
    );
    info!(
        "{} better copies staged, {} matches completed",
        format!("{}", summary.copies_staged).green(),
        format!("{}", summary.matches_completed).green(),
    );
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
