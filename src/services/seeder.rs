use std::ops::RangeInclusive;

use serde::Serialize;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use crate::db::{Table, repository};
use crate::error::AppError;
use crate::schedule::{ClockTime, SLOT_MINUTE};

/// Teaching days, Monday to Friday, spelled as in the course export.
pub const WEEKDAYS: [&str; 5] = ["Pazartesi", "Salı", "Çarşamba", "Perşembe", "Cuma"];

/// First and last slot hour of each teaching day.
pub const SLOT_HOURS: RangeInclusive<u32> = 8..=21;

/// The weekly grid of bookable hours.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    pub days: Vec<String>,
    pub hours: RangeInclusive<u32>,
}

impl Default for CalendarGrid {
    fn default() -> Self {
        Self {
            days: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
            hours: SLOT_HOURS,
        }
    }
}

impl CalendarGrid {
    pub fn label(hour: u32) -> String {
        ClockTime::new(hour, SLOT_MINUTE).to_string()
    }

    /// Every (day, label) cell, day-major, in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.days.iter().flat_map(move |day| {
            self.hours
                .clone()
                .map(move |hour| (day.as_str(), Self::label(hour)))
        })
    }

    pub fn len(&self) -> usize {
        self.days.len() * self.hours.clone().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedStats {
    pub inserted: usize,
    pub total: i64,
}

/// Inserts one `time_slots` row per grid cell inside a single transaction,
/// so ids are sequential day by day. Running it twice without a schema
/// reset duplicates the grid.
pub async fn seed_time_slots(
    conn: &mut SqliteConnection,
    grid: &CalendarGrid,
) -> Result<SeedStats, AppError> {
    info!("inserting {} time slots", grid.len());
    let mut tx = conn.begin().await?;

    let mut inserted = 0;
    for (day, label) in grid.cells() {
        repository::insert_time_slot(&mut tx, day, &label).await?;
        inserted += 1;
    }
    tx.commit().await?;

    let total = repository::count_rows(conn, Table::TimeSlots).await?;
    info!("inserted {} time slots, table now holds {}", inserted, total);

    Ok(SeedStats { inserted, total })
}
