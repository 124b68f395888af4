use rust_decimal::prelude::ToPrimitive;
use sqlx::SqliteConnection;

use crate::db::Table;
use crate::models::{Course, CourseSummary, CourseTimeSlot, NewCourse, TimeSlot};

pub async fn insert_course(conn: &mut SqliteConnection, course: &NewCourse) -> Result<i64, sqlx::Error> {
    let credits = course.credits.to_f64().ok_or_else(|| {
        sqlx::Error::Encode(format!("credits {} out of range", course.credits).into())
    })?;

    let id = sqlx::query(
        r#"
        INSERT INTO courses
            (course_name, section_name, faculty, description, credits, lecturer, required)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&course.course_name)
    .bind(&course.section_name)
    .bind(&course.faculty)
    .bind(&course.description)
    .bind(credits)
    .bind(&course.lecturer)
    .bind(course.required)
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn fetch_courses(conn: &mut SqliteConnection) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, course_name, section_name, faculty, description, credits, lecturer, required FROM courses ORDER BY id",
    )
    .fetch_all(conn)
    .await
}

pub async fn sample_courses(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<CourseSummary>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummary>(
        "SELECT course_name, section_name, lecturer, credits FROM courses ORDER BY id LIMIT ?",
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}

pub async fn insert_time_slot(
    conn: &mut SqliteConnection,
    day_of_week: &str,
    hour_of_day: &str,
) -> Result<i64, sqlx::Error> {
    let id = sqlx::query("INSERT INTO time_slots (day_of_week, hour_of_day) VALUES (?1, ?2)")
        .bind(day_of_week)
        .bind(hour_of_day)
        .execute(conn)
        .await?
        .last_insert_rowid();

    Ok(id)
}

/// Looks up a slot by day and label. When the grid was seeded more than
/// once the lowest id wins.
pub async fn find_time_slot_id(
    conn: &mut SqliteConnection,
    day_of_week: &str,
    hour_of_day: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT time_id FROM time_slots WHERE day_of_week = ?1 AND hour_of_day = ?2 ORDER BY time_id LIMIT 1",
    )
    .bind(day_of_week)
    .bind(hour_of_day)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_time_slots(conn: &mut SqliteConnection) -> Result<Vec<TimeSlot>, sqlx::Error> {
    sqlx::query_as::<_, TimeSlot>(
        "SELECT time_id, day_of_week, hour_of_day FROM time_slots ORDER BY time_id",
    )
    .fetch_all(conn)
    .await
}

pub async fn insert_course_time_slot(
    conn: &mut SqliteConnection,
    course_id: i64,
    start_time_id: i64,
    end_time_id: i64,
) -> Result<i64, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO course_time_slots (course_id, start_time_id, end_time_id) VALUES (?1, ?2, ?3)",
    )
    .bind(course_id)
    .bind(start_time_id)
    .bind(end_time_id)
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn fetch_course_time_slots(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<Vec<CourseTimeSlot>, sqlx::Error> {
    sqlx::query_as::<_, CourseTimeSlot>(
        "SELECT id, course_id, start_time_id, end_time_id FROM course_time_slots WHERE course_id = ? ORDER BY id",
    )
    .bind(course_id)
    .fetch_all(conn)
    .await
}

pub async fn count_rows(conn: &mut SqliteConnection, table: Table) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table.name()))
        .fetch_one(conn)
        .await
}
