use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{ByteRecord, StringRecord};
use serde::Serialize;
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

use crate::db::{Table, repository};
use crate::error::{AppError, RowError};
use crate::models::CourseRecord;
use crate::schedule::{Session, SessionSkip};

const PROGRESS_EVERY: usize = 10;

/// What happened to one data row of the export.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Imported {
        course_id: i64,
        section_name: String,
        linked_sessions: usize,
        skipped_sessions: Vec<SessionSkip>,
    },
    Skipped {
        reason: String,
        raw: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    /// 1-based position among the data rows, header excluded.
    pub index: usize,
    /// Line of the record in the source file, when the reader knows it.
    pub line: Option<u64>,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<RowReport>,
    /// Table sizes read back after commit.
    pub committed_courses: i64,
    pub committed_course_time_slots: i64,
}

impl ImportReport {
    pub fn imported_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Imported { .. }))
            .count()
    }

    pub fn skipped_rows(&self) -> usize {
        self.rows.len() - self.imported_rows()
    }

    pub fn linked_sessions(&self) -> usize {
        self.rows
            .iter()
            .map(|r| match &r.outcome {
                RowOutcome::Imported { linked_sessions, .. } => *linked_sessions,
                RowOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn skipped_sessions(&self) -> usize {
        self.rows
            .iter()
            .map(|r| match &r.outcome {
                RowOutcome::Imported { skipped_sessions, .. } => skipped_sessions.len(),
                RowOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// True when every row and every session made it into the database.
    pub fn is_clean(&self) -> bool {
        self.skipped_rows() == 0 && self.skipped_sessions() == 0
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import of {}", self.source)?;
        writeln!(
            f,
            "  rows: {} imported, {} skipped",
            self.imported_rows(),
            self.skipped_rows()
        )?;
        writeln!(
            f,
            "  sessions: {} linked, {} skipped",
            self.linked_sessions(),
            self.skipped_sessions()
        )?;
        writeln!(
            f,
            "  committed: {} courses, {} course time slots",
            self.committed_courses, self.committed_course_time_slots
        )?;

        for row in &self.rows {
            match &row.outcome {
                RowOutcome::Skipped { reason, .. } => {
                    writeln!(f, "  row {} skipped: {}", row.index, reason)?;
                }
                RowOutcome::Imported {
                    section_name,
                    skipped_sessions,
                    ..
                } => {
                    for skip in skipped_sessions {
                        writeln!(f, "  row {} ({}): {}", row.index, section_name, skip)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Imports the course export at `path`.
///
/// A missing or unreadable file is fatal. Everything after that is isolated
/// per row.
pub async fn import_courses(conn: &mut SqliteConnection, path: &Path) -> Result<ImportReport, AppError> {
    info!("reading courses from {}", path.display());
    let file = File::open(path).map_err(|source| AppError::CsvFile {
        path: path.to_path_buf(),
        source,
    })?;

    import_from_reader(conn, file, &path.display().to_string()).await
}

/// Imports CSV data from any reader. The first record is the header and is
/// discarded.
///
/// The whole import runs in one transaction and every row in a savepoint of
/// its own, so a failing row leaves nothing behind and the rows around it
/// still commit.
pub async fn import_from_reader<R: io::Read>(
    conn: &mut SqliteConnection,
    reader: R,
    source: &str,
) -> Result<ImportReport, AppError> {
    let started_at = Utc::now();

    // Records are read up front. An I/O failure means the file itself is
    // unreadable, anything else is a problem with that one record.
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for record in csv_reader.byte_records() {
        match record {
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(AppError::CsvFile {
                    path: PathBuf::from(source),
                    source: io::Error::from(e),
                });
            }
            other => records.push(other),
        }
    }
    info!("processing {} courses", records.len());

    let mut rows = Vec::with_capacity(records.len());
    let mut tx = conn.begin().await?;

    for (i, record) in records.into_iter().enumerate() {
        let index = i + 1;
        let line = match &record {
            Ok(r) => r.position(),
            Err(e) => e.position(),
        }
        .map(|p| p.line());
        let raw: Vec<String> = match &record {
            Ok(r) => r
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };

        let mut savepoint = tx.begin().await?;
        let outcome = match import_row(&mut savepoint, record).await {
            Ok(outcome) => {
                savepoint.commit().await?;
                outcome
            }
            Err(e) => {
                savepoint.rollback().await?;
                warn!("error processing row {}: {}", index, e);
                warn!("   row data: {:?}", raw);
                RowOutcome::Skipped {
                    reason: e.to_string(),
                    raw,
                }
            }
        };
        rows.push(RowReport {
            index,
            line,
            outcome,
        });

        if index % PROGRESS_EVERY == 0 {
            info!("processed {} rows", index);
        }
    }

    tx.commit().await?;

    let committed_courses = repository::count_rows(conn, Table::Courses).await?;
    let committed_course_time_slots = repository::count_rows(conn, Table::CourseTimeSlots).await?;
    info!(
        "courses table holds {} rows, course_time_slots holds {}",
        committed_courses, committed_course_time_slots
    );

    Ok(ImportReport {
        source: source.to_string(),
        started_at,
        finished_at: Utc::now(),
        rows,
        committed_courses,
        committed_course_time_slots,
    })
}

async fn import_row(
    conn: &mut SqliteConnection,
    record: Result<ByteRecord, csv::Error>,
) -> Result<RowOutcome, RowError> {
    let record = CourseRecord::from_record(&StringRecord::from_byte_record(record?)?)?;
    let sessions = record.sessions()?;
    let course = record.to_new_course(&sessions)?;

    let course_id = repository::insert_course(conn, &course).await?;
    debug!("inserted course {} as id {}", course.section_name, course_id);

    let mut linked_sessions = 0;
    let mut skipped_sessions = Vec::new();
    for session in &sessions {
        match resolve_session(conn, session).await? {
            Resolution::Slots { start_id, end_id } => {
                repository::insert_course_time_slot(conn, course_id, start_id, end_id).await?;
                linked_sessions += 1;
            }
            Resolution::Skip(skip) => {
                warn!("skipping session of {}: {}", record.course_name, skip);
                skipped_sessions.push(skip);
            }
        }
    }

    Ok(RowOutcome::Imported {
        course_id,
        section_name: course.section_name,
        linked_sessions,
        skipped_sessions,
    })
}

enum Resolution {
    Slots { start_id: i64, end_id: i64 },
    Skip(SessionSkip),
}

/// Finds the start and end slot ids of a session on its own day.
async fn resolve_session(
    conn: &mut SqliteConnection,
    session: &Session,
) -> Result<Resolution, sqlx::Error> {
    let span = match session.slot_span() {
        Ok(span) => span,
        Err(skip) => return Ok(Resolution::Skip(skip)),
    };

    let start = repository::find_time_slot_id(conn, &session.day, &span.start).await?;
    let end = repository::find_time_slot_id(conn, &session.day, &span.end).await?;

    Ok(match (start, end) {
        (Some(start_id), Some(end_id)) => Resolution::Slots { start_id, end_id },
        _ => Resolution::Skip(SessionSkip::SlotNotFound {
            day: session.day.clone(),
            start: span.start,
            end: span.end,
        }),
    })
}
