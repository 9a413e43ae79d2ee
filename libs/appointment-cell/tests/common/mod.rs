#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use shared_database::{ensure_schema, AppState};
use shared_utils::test_utils::TestConfig;

/// In-memory database with the full schema applied. A single connection
/// keeps the in-memory database alive and shared across the test.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    ensure_schema(&pool).await.unwrap();
    pool
}

pub fn test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState {
        config: TestConfig::default().to_app_config(),
        db: pool,
    })
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

pub async fn seed_hospital(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO hospitals (name, district) VALUES (?, 'North District') RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_doctor(pool: &SqlitePool, hospital_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO doctors (full_name, hospital_id, is_active) VALUES (?, ?, 1) RETURNING id")
        .bind(name)
        .bind(hospital_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_patient(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (full_name, phone) VALUES (?, '0800000000') RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_template(
    pool: &SqlitePool,
    doctor_id: i64,
    day_of_week: u8,
    start: &str,
    end: &str,
    consultation_type: &str,
    duration_minutes: i64,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO slot_templates
            (doctor_id, day_of_week, start_time, end_time, consultation_type,
             duration_minutes, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?)
        RETURNING id
        "#,
    )
    .bind(doctor_id)
    .bind(day_of_week as i64)
    .bind(t(start))
    .bind(t(end))
    .bind(consultation_type)
    .bind(duration_minutes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a concrete slot directly, bypassing template generation.
pub async fn seed_slot(
    pool: &SqlitePool,
    doctor_id: i64,
    date: &str,
    start: &str,
    end: &str,
    consultation_type: &str,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO slots
            (doctor_id, date, start_time, end_time, consultation_type, is_booked, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        RETURNING id
        "#,
    )
    .bind(doctor_id)
    .bind(d(date))
    .bind(t(start))
    .bind(t(end))
    .bind(consultation_type)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn slot_count(pool: &SqlitePool, doctor_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM slots WHERE doctor_id = ?")
        .bind(doctor_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn slot_is_booked(pool: &SqlitePool, slot_id: i64) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT is_booked FROM slots WHERE id = ?")
        .bind(slot_id)
        .fetch_one(pool)
        .await
        .unwrap()
        != 0
}
