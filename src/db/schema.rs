use sqlx::{Connection, SqliteConnection};
use tracing::{error, info};

use crate::config::SchemaMode;
use crate::error::AppError;

/// The three tables of the scheduling dataset, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Courses,
    TimeSlots,
    CourseTimeSlots,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Courses, Table::TimeSlots, Table::CourseTimeSlots];

    pub fn name(self) -> &'static str {
        match self {
            Table::Courses => "courses",
            Table::TimeSlots => "time_slots",
            Table::CourseTimeSlots => "course_time_slots",
        }
    }

    fn columns(self) -> &'static str {
        match self {
            Table::Courses => {
                r#"
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_name TEXT NOT NULL,
                section_name TEXT NOT NULL,
                faculty TEXT NOT NULL,
                description TEXT,
                credits REAL NOT NULL,
                lecturer TEXT NOT NULL,
                required INTEGER NOT NULL
                "#
            }
            Table::TimeSlots => {
                r#"
                time_id INTEGER PRIMARY KEY AUTOINCREMENT,
                day_of_week TEXT NOT NULL,
                hour_of_day TEXT NOT NULL
                "#
            }
            Table::CourseTimeSlots => {
                r#"
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                start_time_id INTEGER NOT NULL,
                end_time_id INTEGER NOT NULL,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
                FOREIGN KEY (start_time_id) REFERENCES time_slots(time_id),
                FOREIGN KEY (end_time_id) REFERENCES time_slots(time_id)
                "#
            }
        }
    }
}

const INDEXES: [(&str, &str); 3] = [
    ("idx_course_name", "courses(course_name)"),
    ("idx_course_sections", "courses(course_name, section_name)"),
    ("idx_course_time_slots", "course_time_slots(course_id)"),
];

/// Creates the tables and indexes in one transaction.
///
/// In [`SchemaMode::Reset`] existing tables are dropped first. Any failing
/// statement rolls back everything this call did.
pub async fn create_schema(conn: &mut SqliteConnection, mode: SchemaMode) -> Result<(), AppError> {
    info!("creating schema (mode: {})", mode);
    let mut tx = conn.begin().await?;

    match apply_ddl(&mut tx, mode).await {
        Ok(()) => {
            tx.commit().await?;
            info!("schema ready");
            Ok(())
        }
        Err(e) => {
            error!("schema creation failed, rolling back: {}", e);
            if let Err(rollback) = tx.rollback().await {
                error!("rollback failed: {}", rollback);
            }
            Err(e.into())
        }
    }
}

async fn apply_ddl(conn: &mut SqliteConnection, mode: SchemaMode) -> Result<(), sqlx::Error> {
    if mode == SchemaMode::Reset {
        for table in Table::ALL.iter().rev() {
            info!("dropping table {}", table.name());
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.name()))
                .execute(&mut *conn)
                .await?;
        }
    }

    for table in Table::ALL {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            table.name(),
            table.columns()
        ))
        .execute(&mut *conn)
        .await?;
        info!("table {} created", table.name());
    }

    for (name, target) in INDEXES {
        sqlx::query(&format!("CREATE INDEX IF NOT EXISTS {name} ON {target}"))
            .execute(&mut *conn)
            .await?;
    }
    info!("indexes created");

    Ok(())
}
