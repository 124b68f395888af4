use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_loader::config::{Config, SchemaMode};
use schedule_loader::error::AppError;
use schedule_loader::services::pipeline::{self, RunStatus};

#[derive(Parser, Debug)]
#[command(version, about = "Provision the course schedule database and load a course export", long_about = None)]
struct Args {
    /// Database URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema, seed time slots, import courses and verify
    Setup {
        /// `reset` drops existing tables, `ensure` keeps them
        #[arg(long)]
        mode: Option<SchemaMode>,
        /// Course export, overrides COURSES_CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Create the tables and indexes
    Schema {
        #[arg(long)]
        mode: Option<SchemaMode>,
    },
    /// Insert the weekly time slot grid
    Seed,
    /// Import courses from a CSV export
    Import {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print table counts and sample courses
    Verify,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "schedule_loader=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(RunStatus::Failed.code())
        }
    }
}

async fn run(args: Args) -> Result<RunStatus, AppError> {
    let mut config = Config::new_from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    match args.command {
        Command::Setup { mode, csv } => {
            apply_overrides(&mut config, mode, csv);
            let summary = pipeline::run_setup(&config).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                if let Some(report) = &summary.import {
                    println!("{report}");
                }
                println!("{}", summary.verification);
            }
            if let Some(e) = &summary.import_error {
                error!("setup finished without importing courses: {}", e);
            } else {
                info!("database setup complete");
            }
            Ok(summary.status())
        }
        Command::Schema { mode } => {
            apply_overrides(&mut config, mode, None);
            pipeline::run_schema(&config).await?;
            Ok(RunStatus::Complete)
        }
        Command::Seed => {
            let stats = pipeline::run_seed(&config).await?;
            emit(&stats, args.json, format!("Inserted {} time slots ({} total)", stats.inserted, stats.total))?;
            Ok(RunStatus::Complete)
        }
        Command::Import { csv } => {
            apply_overrides(&mut config, None, csv);
            let report = pipeline::run_import(&config).await?;
            emit(&report, args.json, &report)?;
            Ok(RunStatus::of_import(&report))
        }
        Command::Verify => {
            let report = pipeline::run_verify(&config).await?;
            emit(&report, args.json, &report)?;
            Ok(RunStatus::Complete)
        }
    }
}

fn apply_overrides(config: &mut Config, mode: Option<SchemaMode>, csv: Option<PathBuf>) {
    if let Some(mode) = mode {
        config.schema_mode = mode;
    }
    if let Some(csv) = csv {
        config.csv_path = csv;
    }
}

fn emit<T: Serialize>(value: &T, json: bool, text: impl Display) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}
