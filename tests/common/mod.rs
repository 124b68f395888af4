#![allow(dead_code)]

use schedule_loader::config::SchemaMode;
use schedule_loader::db::create_schema;
use schedule_loader::services::importer::import_from_reader;
use schedule_loader::services::seeder::{CalendarGrid, seed_time_slots};
use schedule_loader::services::ImportReport;
use sqlx::{Connection, SqliteConnection};

pub const HEADER: &str = "course_name,section,faculty,description,credits,lecturer,schedule\n";

pub async fn memory_db() -> SqliteConnection {
    SqliteConnection::connect("sqlite::memory:")
        .await
        .expect("Failed to create database")
}

/// In-memory database with a fresh schema and the default slot grid.
pub async fn seeded_db() -> SqliteConnection {
    let mut conn = memory_db().await;
    create_schema(&mut conn, SchemaMode::Reset)
        .await
        .expect("Failed to create schema");
    seed_time_slots(&mut conn, &CalendarGrid::default())
        .await
        .expect("Failed to seed time slots");
    conn
}

/// Imports `rows` (without header) from memory.
pub async fn import_rows(conn: &mut SqliteConnection, rows: &str) -> ImportReport {
    let csv = format!("{HEADER}{rows}");
    import_from_reader(conn, csv.as_bytes(), "memory")
        .await
        .expect("Import failed")
}
