use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use tracing::debug;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://ozu_schedule.db";
const DEFAULT_CSV_PATH: &str = "lessons.csv";

/// How the schema manager treats existing tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Drop and recreate every table. All data is lost.
    #[default]
    Reset,
    /// Create missing tables only, keeping whatever rows exist.
    Ensure,
}

impl FromStr for SchemaMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "ensure" => Ok(Self::Ensure),
            other => Err(AppError::Config(format!(
                "unknown schema mode {other:?}, expected `reset` or `ensure`"
            ))),
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Ensure => f.write_str("ensure"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub csv_path: PathBuf,
    pub schema_mode: SchemaMode,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            schema_mode: SchemaMode::default(),
        }
    }

    /// Reads `DATABASE_URL` (falling back to `DB_NAME`), `COURSES_CSV` and
    /// `SCHEMA_MODE`. Call `dotenvy::dotenv()` first to honour a `.env` file.
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = match (env::var("DATABASE_URL"), env::var("DB_NAME")) {
            (Ok(url), _) => url,
            (Err(_), Ok(name)) => format!("sqlite://{name}.db"),
            (Err(_), Err(_)) => DEFAULT_DATABASE_URL.to_string(),
        };
        let csv_path = env::var("COURSES_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV_PATH));
        let schema_mode = match env::var("SCHEMA_MODE") {
            Ok(mode) => mode.parse()?,
            Err(_) => SchemaMode::default(),
        };

        Ok(Self {
            database_url,
            csv_path,
            schema_mode,
        })
    }

    pub fn connect_options(&self) -> Result<SqliteConnectOptions, AppError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);
        Ok(options)
    }

    /// Opens the single connection an operation works on.
    pub async fn connect(&self) -> Result<SqliteConnection, AppError> {
        debug!("connecting to {}", self.database_url);
        let conn = SqliteConnection::connect_with(&self.connect_options()?).await?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mode_parses_case_insensitively() {
        assert_eq!("reset".parse::<SchemaMode>().unwrap(), SchemaMode::Reset);
        assert_eq!(" Ensure ".parse::<SchemaMode>().unwrap(), SchemaMode::Ensure);
        assert!(matches!(
            "truncate".parse::<SchemaMode>(),
            Err(AppError::Config(_))
        ));
    }
}
