use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use shared_config::AppConfig;

/// Shared application state handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: SqlitePool,
}

/// Open the pool for the configured database. WAL mode keeps concurrent
/// readers off the writers' backs; the busy timeout covers short write
/// contention instead of surfacing SQLITE_BUSY to callers.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create tables and indexes if they do not exist yet.
///
/// Two indexes carry the booking subsystem's concurrency guarantees:
/// the unique (doctor_id, date, start_time) key on slots makes concurrent
/// materialization idempotent, and the partial unique index on scheduled
/// appointments enforces at most one active appointment per slot.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    let tables = [
        r#"
        CREATE TABLE IF NOT EXISTS hospitals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            district TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            phone TEXT,
            hospital_id INTEGER REFERENCES hospitals(id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            hospital_id INTEGER NOT NULL REFERENCES hospitals(id),
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS slot_templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            doctor_id INTEGER NOT NULL REFERENCES doctors(id),
            day_of_week INTEGER NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            consultation_type TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL DEFAULT 15,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            doctor_id INTEGER NOT NULL REFERENCES doctors(id),
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            consultation_type TEXT NOT NULL,
            is_booked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES users(id),
            slot_id INTEGER NOT NULL REFERENCES slots(id),
            chief_complaint TEXT,
            status TEXT NOT NULL DEFAULT 'scheduled',
            video_meeting_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )
        "#,
    ];

    for sql in tables {
        sqlx::query(sql).execute(pool).await?;
    }

    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_slots_doctor_date_start
             ON slots(doctor_id, date, start_time)",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_appointments_active_slot
             ON appointments(slot_id) WHERE status = 'scheduled'",
        "CREATE INDEX IF NOT EXISTS idx_slot_templates_doctor ON slot_templates(doctor_id)",
        "CREATE INDEX IF NOT EXISTS idx_slots_doctor_date ON slots(doctor_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_doctors_hospital ON doctors(hospital_id)",
    ];

    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    info!("Database schema ready");
    Ok(())
}
