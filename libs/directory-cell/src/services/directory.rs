use sqlx::SqlitePool;
use tracing::debug;

use shared_database::AppState;

use crate::models::{DoctorProfile, Hospital, PatientRecord};

/// Read-only lookups over the doctor/hospital directory. The booking
/// subsystem consumes this for display hydration; it never mutates here.
pub struct DirectoryService {
    db: SqlitePool,
}

impl DirectoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub fn with_pool(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Fetch a doctor with their hospital, active or not. Callers decide
    /// what inactive means for them.
    pub async fn get_doctor_profile(&self, doctor_id: i64) -> sqlx::Result<Option<DoctorProfile>> {
        debug!("Fetching doctor profile: {}", doctor_id);

        sqlx::query_as::<_, DoctorProfile>(
            r#"
            SELECT d.id, d.full_name, d.hospital_id, h.name AS hospital_name, d.is_active
            FROM doctors d
            JOIN hospitals h ON h.id = d.hospital_id
            WHERE d.id = ?
            "#,
        )
        .bind(doctor_id)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn list_doctors(&self) -> sqlx::Result<Vec<DoctorProfile>> {
        sqlx::query_as::<_, DoctorProfile>(
            r#"
            SELECT d.id, d.full_name, d.hospital_id, h.name AS hospital_name, d.is_active
            FROM doctors d
            JOIN hospitals h ON h.id = d.hospital_id
            WHERE d.is_active = 1
            ORDER BY d.full_name
            "#,
        )
        .fetch_all(&self.db)
        .await
    }

    pub async fn list_hospitals(&self) -> sqlx::Result<Vec<Hospital>> {
        sqlx::query_as::<_, Hospital>("SELECT id, name, district FROM hospitals ORDER BY name")
            .fetch_all(&self.db)
            .await
    }

    pub async fn get_patient(&self, patient_id: i64) -> sqlx::Result<Option<PatientRecord>> {
        sqlx::query_as::<_, PatientRecord>("SELECT id, full_name, phone FROM users WHERE id = ?")
            .bind(patient_id)
            .fetch_optional(&self.db)
            .await
    }
}
