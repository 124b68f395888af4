use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub time_id: i64,
    pub day_of_week: String,
    pub hour_of_day: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CourseTimeSlot {
    pub id: i64,
    pub course_id: i64,
    pub start_time_id: i64,
    pub end_time_id: i64,
}
