mod common;

use schedule_loader::config::SchemaMode;
use schedule_loader::db::{Table, create_schema, repository};
use schedule_loader::error::AppError;
use schedule_loader::services::seeder::{CalendarGrid, seed_time_slots};
use schedule_loader::services::verifier::verify;

use common::{import_rows, memory_db, seeded_db};

const ROWS: &str = "CS101,A,Eng,desc,3.0,Doe,Pazartesi | 09:40 - 11:30\n\
                    CS102,B,Eng,desc,4,Roe,Cuma | 13:40 - 15:30\n";

#[tokio::test]
async fn test_seeded_grid_is_sequential_per_day() {
    let mut conn = seeded_db().await;

    let slots = repository::fetch_time_slots(&mut conn)
        .await
        .expect("Failed to fetch time slots");
    assert_eq!(slots.len(), 70);

    assert_eq!(slots[0].time_id, 1);
    assert_eq!(slots[0].day_of_week, "Pazartesi");
    assert_eq!(slots[0].hour_of_day, "8:40");

    // each day is a block of 14 consecutive ids
    assert_eq!(slots[14].day_of_week, "Salı");
    assert_eq!(slots[14].hour_of_day, "8:40");
    assert_eq!(slots[14].time_id, 15);
    assert_eq!(slots[69].day_of_week, "Cuma");
    assert_eq!(slots[69].hour_of_day, "21:40");
}

#[tokio::test]
async fn test_reset_twice_leaves_only_the_grid() {
    let mut conn = seeded_db().await;
    import_rows(&mut conn, ROWS).await;

    for _ in 0..2 {
        create_schema(&mut conn, SchemaMode::Reset)
            .await
            .expect("Failed to reset schema");
        seed_time_slots(&mut conn, &CalendarGrid::default())
            .await
            .expect("Failed to seed time slots");
    }

    let report = verify(&mut conn).await.expect("Failed to verify");
    assert_eq!(report.time_slots, 70);
    assert_eq!(report.courses, 0);
    assert_eq!(report.course_time_slots, 0);
    assert!(report.samples.is_empty());
}

#[tokio::test]
async fn test_ensure_mode_keeps_rows() {
    let mut conn = seeded_db().await;
    import_rows(&mut conn, ROWS).await;

    create_schema(&mut conn, SchemaMode::Ensure)
        .await
        .expect("Failed to ensure schema");

    let report = verify(&mut conn).await.expect("Failed to verify");
    assert_eq!(report.courses, 2);
    assert_eq!(report.time_slots, 70);
    assert_eq!(report.course_time_slots, 2);
}

#[tokio::test]
async fn test_ensure_mode_reseed_duplicates_grid() {
    let mut conn = seeded_db().await;
    create_schema(&mut conn, SchemaMode::Ensure)
        .await
        .expect("Failed to ensure schema");
    let stats = seed_time_slots(&mut conn, &CalendarGrid::default())
        .await
        .expect("Failed to seed time slots");

    assert_eq!(stats.inserted, 70);
    assert_eq!(stats.total, 140);

    // lookups still resolve to the first grid
    let id = repository::find_time_slot_id(&mut conn, "Salı", "8:40")
        .await
        .expect("Failed to look up slot");
    assert_eq!(id, Some(15));
}

#[tokio::test]
async fn test_ensure_mode_on_empty_database_creates_tables() {
    let mut conn = memory_db().await;
    create_schema(&mut conn, SchemaMode::Ensure)
        .await
        .expect("Failed to ensure schema");

    for table in Table::ALL {
        let count = repository::count_rows(&mut conn, table)
            .await
            .expect("Failed to count rows");
        assert_eq!(count, 0, "{} should be empty", table.name());
    }
}

#[tokio::test]
async fn test_deleting_course_cascades_to_mappings() {
    let mut conn = seeded_db().await;
    let report = import_rows(&mut conn, ROWS).await;
    assert_eq!(report.committed_course_time_slots, 2);

    sqlx::query("DELETE FROM courses WHERE course_name = 'CS101'")
        .execute(&mut conn)
        .await
        .expect("Failed to delete course");

    let remaining = repository::count_rows(&mut conn, Table::CourseTimeSlots)
        .await
        .expect("Failed to count rows");
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn test_mapping_requires_existing_time_slot() {
    let mut conn = seeded_db().await;
    import_rows(&mut conn, ROWS).await;

    let result = repository::insert_course_time_slot(&mut conn, 1, 1, 999).await;
    assert!(result.is_err(), "foreign key on end_time_id should reject 999");
}

#[tokio::test]
async fn test_failed_ddl_rolls_back_every_statement() {
    let mut conn = memory_db().await;
    // a foreign `courses` table makes the course_name index fail
    sqlx::query("CREATE TABLE courses (id INTEGER PRIMARY KEY)")
        .execute(&mut conn)
        .await
        .expect("Failed to create conflicting table");

    let result = create_schema(&mut conn, SchemaMode::Ensure).await;
    match result {
        Err(AppError::Database(e)) => {
            assert!(e.to_string().contains("course_name"), "error was {e}")
        }
        other => panic!("unexpected result {other:?}"),
    }

    let created: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('time_slots', 'course_time_slots')",
    )
    .fetch_one(&mut conn)
    .await
    .expect("Failed to read sqlite_master");
    assert_eq!(created, 0);
}
