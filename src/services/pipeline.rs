//! Top-level operations. Each one opens its own connection from the
//! [`Config`] and closes it when done; nothing is shared between steps.

use serde::Serialize;
use sqlx::Connection;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::services::importer::{self, ImportReport};
use crate::services::seeder::{self, CalendarGrid, SeedStats};
use crate::services::verifier::{self, VerificationReport};

pub async fn run_schema(config: &Config) -> Result<(), AppError> {
    let mut conn = config.connect().await?;
    db::create_schema(&mut conn, config.schema_mode).await?;
    conn.close().await?;
    Ok(())
}

pub async fn run_seed(config: &Config) -> Result<SeedStats, AppError> {
    let mut conn = config.connect().await?;
    let stats = seeder::seed_time_slots(&mut conn, &CalendarGrid::default()).await?;
    conn.close().await?;
    Ok(stats)
}

pub async fn run_import(config: &Config) -> Result<ImportReport, AppError> {
    let mut conn = config.connect().await?;
    let report = importer::import_courses(&mut conn, &config.csv_path).await?;
    conn.close().await?;
    Ok(report)
}

pub async fn run_verify(config: &Config) -> Result<VerificationReport, AppError> {
    let mut conn = config.connect().await?;
    let report = verifier::verify(&mut conn).await?;
    conn.close().await?;
    Ok(report)
}

#[derive(Debug, Serialize)]
pub struct SetupSummary {
    pub seed: SeedStats,
    pub import: Option<ImportReport>,
    pub import_error: Option<String>,
    pub verification: VerificationReport,
}

/// How a finished run should be reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    CompletedWithSkips,
    Failed,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Failed => 1,
            RunStatus::CompletedWithSkips => 2,
        }
    }

    pub fn of_import(report: &ImportReport) -> Self {
        if report.is_clean() {
            RunStatus::Complete
        } else {
            RunStatus::CompletedWithSkips
        }
    }
}

impl SetupSummary {
    pub fn status(&self) -> RunStatus {
        match &self.import {
            Some(report) => RunStatus::of_import(report),
            None => RunStatus::Failed,
        }
    }
}

/// Schema, seeding, import and verification, in that order.
///
/// Schema and seeding failures abort the run. A failed import is recorded
/// and the verifier still reports what the database holds.
pub async fn run_setup(config: &Config) -> Result<SetupSummary, AppError> {
    info!("step 1: schema");
    run_schema(config).await?;

    info!("step 2: time slots");
    let seed = run_seed(config).await?;

    info!("step 3: courses from {}", config.csv_path.display());
    let (import, import_error) = match run_import(config).await {
        Ok(report) => (Some(report), None),
        Err(e) => {
            error!("import failed: {}", e);
            (None, Some(e.to_string()))
        }
    };

    info!("step 4: verification");
    let verification = run_verify(config).await?;

    Ok(SetupSummary {
        seed,
        import,
        import_error,
        verification,
    })
}
