use std::fmt;

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::{Table, repository};
use crate::error::AppError;
use crate::models::CourseSummary;

pub const SAMPLE_SIZE: i64 = 5;

const RULE: &str = "==================================================";

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub courses: i64,
    pub time_slots: i64,
    pub course_time_slots: i64,
    pub samples: Vec<CourseSummary>,
}

/// Reads table sizes and a few sample courses. Never writes.
pub async fn verify(conn: &mut SqliteConnection) -> Result<VerificationReport, AppError> {
    let courses = repository::count_rows(conn, Table::Courses).await?;
    let time_slots = repository::count_rows(conn, Table::TimeSlots).await?;
    let course_time_slots = repository::count_rows(conn, Table::CourseTimeSlots).await?;
    let samples = repository::sample_courses(conn, SAMPLE_SIZE).await?;

    Ok(VerificationReport {
        courses,
        time_slots,
        course_time_slots,
        samples,
    })
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "DATABASE VERIFICATION")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total courses: {}", self.courses)?;
        writeln!(f, "Total time slots: {}", self.time_slots)?;
        writeln!(f, "Total course-time mappings: {}", self.course_time_slots)?;

        writeln!(f)?;
        writeln!(f, "Sample courses:")?;
        for c in &self.samples {
            writeln!(
                f,
                "  - {} ({}) - {} - {:.2} credits",
                c.course_name, c.section_name, c.lecturer, c.credits
            )?;
        }
        write!(f, "{RULE}")
    }
}
