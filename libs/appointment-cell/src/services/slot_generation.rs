// libs/appointment-cell/src/services/slot_generation.rs
use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use shared_database::AppState;

use crate::models::SlotTemplate;

/// Materializes concrete slots from weekly templates, on demand.
///
/// Slots are only ever created here, and creation is idempotent: a
/// unique index on (doctor_id, date, start_time) plus INSERT OR IGNORE
/// means repeated generation over an overlapping window never
/// duplicates a slot or touches one that already exists, booked or not.
pub struct SlotGenerationService {
    db: SqlitePool,
}

impl SlotGenerationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub fn with_pool(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Ensure every slot a doctor's active templates imply exists for
    /// each date in `[from, to]` (inclusive). Existing rows are left
    /// untouched. A doctor with no active templates is a no-op.
    pub async fn ensure_slots_generated(
        &self,
        doctor_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> sqlx::Result<u64> {
        let templates = sqlx::query_as::<_, SlotTemplate>(
            r#"
            SELECT id, doctor_id, day_of_week, start_time, end_time,
                   consultation_type, duration_minutes, is_active, created_at
            FROM slot_templates
            WHERE doctor_id = ? AND is_active = 1
            "#,
        )
        .bind(doctor_id)
        .fetch_all(&self.db)
        .await?;

        if templates.is_empty() {
            return Ok(0);
        }

        // Cheap pre-filter so the common fully-generated window skips
        // the write path entirely.
        let existing: HashSet<(NaiveDate, NaiveTime)> = sqlx::query_as::<_, (NaiveDate, NaiveTime)>(
            "SELECT date, start_time FROM slots WHERE doctor_id = ? AND date BETWEEN ? AND ?",
        )
        .bind(doctor_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        let mut staged: Vec<(NaiveDate, NaiveTime, NaiveTime, &SlotTemplate)> = Vec::new();

        for date in from.iter_days().take_while(|d| *d <= to) {
            let weekday = date.weekday().num_days_from_sunday() as u8;

            for template in templates.iter().filter(|t| t.day_of_week == weekday) {
                if template.start_time >= template.end_time || template.duration_minutes <= 0 {
                    warn!(
                        "Skipping malformed slot template {} for doctor {}",
                        template.id, template.doctor_id
                    );
                    continue;
                }

                let step = Duration::minutes(template.duration_minutes);
                let mut cursor = template.start_time;

                loop {
                    let (end, wrapped) = cursor.overflowing_add_signed(step);
                    // A slot must fit entirely inside the template
                    // window; a trailing remainder shorter than the
                    // duration is dropped.
                    if wrapped != 0 || end > template.end_time {
                        break;
                    }

                    if !existing.contains(&(date, cursor)) {
                        staged.push((date, cursor, end, template));
                    }
                    cursor = end;
                }
            }
        }

        if staged.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut inserted = 0u64;
        let mut tx = self.db.begin().await?;

        for (date, start, end, template) in staged {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO slots
                    (doctor_id, date, start_time, end_time, consultation_type, is_booked, created_at)
                VALUES (?, ?, ?, ?, ?, 0, ?)
                "#,
            )
            .bind(doctor_id)
            .bind(date)
            .bind(start)
            .bind(end)
            .bind(template.consultation_type)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        debug!(
            "Generated {} slots for doctor {} between {} and {}",
            inserted, doctor_id, from, to
        );

        Ok(inserted)
    }
}
