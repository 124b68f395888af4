use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::RowError;
use crate::schedule::{self, Session};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    pub section_name: String,
    pub faculty: String,
    pub description: Option<String>,
    pub credits: f64,
    pub lecturer: String,
    pub required: i64,
}

/// The columns shown when sampling imported courses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseSummary {
    pub course_name: String,
    pub section_name: String,
    pub lecturer: String,
    pub credits: f64,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_name: String,
    pub section_name: String,
    pub faculty: String,
    pub description: String,
    pub credits: Decimal,
    pub lecturer: String,
    pub required: i64,
}

/// One data row of the course export, columns in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    pub course_name: String,
    pub section_code: String,
    pub faculty: String,
    pub description: String,
    pub credits: String,
    pub lecturer: String,
    pub schedule: String,
}

/// Largest credit value a `DECIMAL(5,2)` column can carry.
fn max_credits() -> Decimal {
    Decimal::new(99_999, 2)
}

impl CourseRecord {
    pub const COLUMNS: [&'static str; 7] = [
        "course_name",
        "section_code",
        "faculty",
        "description",
        "credits",
        "lecturer",
        "schedule",
    ];

    pub fn from_record(record: &StringRecord) -> Result<Self, RowError> {
        let field = |index: usize| {
            record
                .get(index)
                .map(str::to_string)
                .ok_or(RowError::MissingField(Self::COLUMNS[index]))
        };

        Ok(Self {
            course_name: field(0)?,
            section_code: field(1)?,
            faculty: field(2)?,
            description: field(3)?,
            credits: field(4)?,
            lecturer: field(5)?,
            schedule: field(6)?,
        })
    }

    pub fn section_name(&self) -> String {
        format!("{}{}", self.course_name, self.section_code)
    }

    pub fn parse_credits(&self) -> Result<Decimal, RowError> {
        let raw = self.credits.trim();
        let credits = Decimal::from_str(raw)
            .map_err(|_| RowError::InvalidCredits(self.credits.clone()))?
            .round_dp(2);
        if credits.abs() > max_credits() {
            return Err(RowError::InvalidCredits(self.credits.clone()));
        }
        Ok(credits)
    }

    pub fn sessions(&self) -> Result<Vec<Session>, RowError> {
        Ok(schedule::parse_schedule(&self.schedule)?)
    }

    /// Builds the course row. The sessions are passed in so the schedule
    /// is parsed once per record.
    pub fn to_new_course(&self, sessions: &[Session]) -> Result<NewCourse, RowError> {
        Ok(NewCourse {
            course_name: self.course_name.clone(),
            section_name: self.section_name(),
            faculty: self.faculty.clone(),
            description: self.description.clone(),
            credits: self.parse_credits()?,
            lecturer: self.lecturer.clone(),
            required: schedule::required_hours(sessions),
        })
    }
}
