use std::path::PathBuf;

use thiserror::Error;

use crate::schedule::ScheduleError;

/// Errors that abort the operation they occur in.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read CSV file {}: {source}", path.display())]
    CsvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Errors that only cost the current CSV row.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid credits value {0:?}")]
    InvalidCredits(String),

    #[error("malformed schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("invalid UTF-8 in record: {0}")]
    InvalidUtf8(#[from] csv::FromUtf8Error),

    #[error("unreadable record: {0}")]
    Record(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
