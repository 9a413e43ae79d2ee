// libs/appointment-cell/src/services/booking.rs
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use directory_cell::services::DirectoryService;
use shared_database::AppState;
use shared_models::auth::{AuthUser, Role};

use crate::models::{
    AppointmentError, AppointmentView, HospitalFilter, SlotView,
};
use crate::services::SlotGenerationService;

/// Longest window a single availability search may span, in days.
const MAX_SEARCH_WINDOW_DAYS: i64 = 30;

const APPOINTMENT_VIEW_SQL: &str = r#"
    SELECT a.id, a.slot_id, a.patient_id, a.chief_complaint, a.status,
           a.video_meeting_url, a.created_at, a.updated_at,
           s.date, s.start_time, s.end_time, s.consultation_type, s.doctor_id,
           d.full_name AS doctor_name, d.hospital_id,
           h.name AS hospital_name,
           u.full_name AS patient_name, u.phone AS patient_phone
    FROM appointments a
    JOIN slots s ON s.id = a.slot_id
    JOIN doctors d ON d.id = s.doctor_id
    JOIN hospitals h ON h.id = d.hospital_id
    JOIN users u ON u.id = a.patient_id
"#;

/// Booking state machine over slots and appointments.
///
/// Capacity lives on the slot: `is_booked` is flipped with a
/// conditional UPDATE inside the same transaction that writes the
/// appointment row, so two patients racing for one slot cannot both
/// win. Cancelling releases the slot; rescheduling acquires the new
/// slot before releasing the old one.
pub struct AppointmentService {
    db: SqlitePool,
    slot_gen: SlotGenerationService,
    directory: DirectoryService,
}

impl AppointmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            slot_gen: SlotGenerationService::new(state),
            directory: DirectoryService::new(state),
        }
    }

    pub fn with_pool(db: SqlitePool) -> Self {
        Self {
            slot_gen: SlotGenerationService::with_pool(db.clone()),
            directory: DirectoryService::with_pool(db.clone()),
            db,
        }
    }

    /// Search a doctor's free slots in `[from, to]`, materializing the
    /// window from templates first. An unknown or inactive doctor
    /// yields an empty list rather than an error.
    pub async fn get_available_slots(
        &self,
        doctor_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        consultation_type: Option<crate::models::ConsultationType>,
    ) -> Result<Vec<SlotView>, AppointmentError> {
        if from > to {
            return Err(AppointmentError::InvalidDateRange(
                "'from' must not be after 'to'".to_string(),
            ));
        }
        if (to - from).num_days() > MAX_SEARCH_WINDOW_DAYS {
            return Err(AppointmentError::InvalidDateRange(format!(
                "search window cannot exceed {} days",
                MAX_SEARCH_WINDOW_DAYS
            )));
        }

        let doctor = match self.directory.get_doctor_profile(doctor_id).await? {
            Some(d) if d.is_active => d,
            _ => {
                debug!("Slot search for unknown or inactive doctor {}", doctor_id);
                return Ok(vec![]);
            }
        };

        self.slot_gen
            .ensure_slots_generated(doctor.id, from, to)
            .await?;

        let mut slots = sqlx::query_as::<_, SlotView>(
            r#"
            SELECT s.id, s.doctor_id, d.full_name AS doctor_name,
                   d.hospital_id, h.name AS hospital_name,
                   s.date, s.start_time, s.end_time, s.consultation_type
            FROM slots s
            JOIN doctors d ON d.id = s.doctor_id
            JOIN hospitals h ON h.id = d.hospital_id
            WHERE s.doctor_id = ? AND s.is_booked = 0 AND s.date BETWEEN ? AND ?
            ORDER BY s.date, s.start_time
            "#,
        )
        .bind(doctor_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        if let Some(wanted) = consultation_type {
            slots.retain(|s| s.consultation_type == wanted);
        }

        Ok(slots)
    }

    /// Book a slot for a patient. The slot flip and the appointment
    /// insert commit together or not at all.
    pub async fn book(
        &self,
        patient_id: i64,
        slot_id: i64,
        chief_complaint: Option<String>,
    ) -> Result<AppointmentView, AppointmentError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let claimed = sqlx::query("UPDATE slots SET is_booked = 1 WHERE id = ? AND is_booked = 0")
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

        if claimed.rows_affected() == 0 {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO appointments
                (patient_id, slot_id, chief_complaint, status, created_at, updated_at)
            VALUES (?, ?, ?, 'scheduled', ?, ?)
            RETURNING id
            "#,
        )
        .bind(patient_id)
        .bind(slot_id)
        .bind(&chief_complaint)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Patient {} booked slot {} as appointment {}",
            patient_id, slot_id, appointment_id
        );

        self.fetch_view(appointment_id).await
    }

    /// Cancel a patient's own scheduled appointment, releasing its slot.
    /// Anything already cancelled, completed or no-show is immutable.
    pub async fn cancel(
        &self,
        appointment_id: i64,
        patient_id: i64,
    ) -> Result<AppointmentView, AppointmentError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let released: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE appointments SET status = 'cancelled', updated_at = ?
            WHERE id = ? AND patient_id = ? AND status = 'scheduled'
            RETURNING slot_id
            "#,
        )
        .bind(now)
        .bind(appointment_id)
        .bind(patient_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((slot_id,)) = released else {
            return Err(AppointmentError::NotModifiable);
        };

        sqlx::query("UPDATE slots SET is_booked = 0 WHERE id = ?")
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Patient {} cancelled appointment {}, slot {} released",
            patient_id, appointment_id, slot_id
        );

        self.fetch_view(appointment_id).await
    }

    /// Replace the chief complaint on a patient's scheduled appointment.
    pub async fn update_chief_complaint(
        &self,
        appointment_id: i64,
        patient_id: i64,
        chief_complaint: Option<String>,
    ) -> Result<AppointmentView, AppointmentError> {
        let updated = sqlx::query(
            r#"
            UPDATE appointments SET chief_complaint = ?, updated_at = ?
            WHERE id = ? AND patient_id = ? AND status = 'scheduled'
            "#,
        )
        .bind(&chief_complaint)
        .bind(Utc::now())
        .bind(appointment_id)
        .bind(patient_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppointmentError::NotModifiable);
        }

        self.fetch_view(appointment_id).await
    }

    /// Move a scheduled appointment onto a different slot. The new slot
    /// is claimed before the old one is released, inside one
    /// transaction, so the appointment never holds zero or two slots.
    pub async fn reschedule(
        &self,
        appointment_id: i64,
        patient_id: i64,
        new_slot_id: i64,
        chief_complaint: Option<String>,
    ) -> Result<AppointmentView, AppointmentError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let current: Option<(i64,)> = sqlx::query_as(
            "SELECT slot_id FROM appointments WHERE id = ? AND patient_id = ? AND status = 'scheduled'",
        )
        .bind(appointment_id)
        .bind(patient_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((old_slot_id,)) = current else {
            return Err(AppointmentError::NotModifiable);
        };

        if old_slot_id == new_slot_id {
            // Nothing to move; treat as a plain field update.
            drop(tx);
            return self
                .update_chief_complaint(appointment_id, patient_id, chief_complaint)
                .await;
        }

        let claimed = sqlx::query("UPDATE slots SET is_booked = 1 WHERE id = ? AND is_booked = 0")
            .bind(new_slot_id)
            .execute(&mut *tx)
            .await?;

        if claimed.rows_affected() == 0 {
            return Err(AppointmentError::SlotNotAvailable);
        }

        sqlx::query("UPDATE slots SET is_booked = 0 WHERE id = ?")
            .bind(old_slot_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE appointments
            SET slot_id = ?, chief_complaint = COALESCE(?, chief_complaint), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_slot_id)
        .bind(&chief_complaint)
        .bind(now)
        .bind(appointment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Appointment {} rescheduled from slot {} to slot {}",
            appointment_id, old_slot_id, new_slot_id
        );

        self.fetch_view(appointment_id).await
    }

    /// Fetch one appointment, scoped to the caller. Patients only see
    /// their own (a mismatch reads as not-found, so existence leaks
    /// nothing); hospital admins only see their hospital's.
    pub async fn get_appointment(
        &self,
        appointment_id: i64,
        user: &AuthUser,
    ) -> Result<AppointmentView, AppointmentError> {
        let sql = format!("{} WHERE a.id = ?", APPOINTMENT_VIEW_SQL);
        let view = sqlx::query_as::<_, AppointmentView>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        match user.role {
            Role::SuperAdmin => Ok(view),
            Role::Patient => {
                if view.patient_id == user.id {
                    Ok(view)
                } else {
                    Err(AppointmentError::NotFound)
                }
            }
            Role::HospitalAdmin => {
                if user.hospital_id == Some(view.hospital_id) {
                    Ok(view)
                } else {
                    Err(AppointmentError::Forbidden)
                }
            }
        }
    }

    /// A patient's own appointments, newest first.
    pub async fn get_my_appointments(
        &self,
        patient_id: i64,
    ) -> Result<Vec<AppointmentView>, AppointmentError> {
        let sql = format!(
            "{} WHERE a.patient_id = ? ORDER BY s.date DESC, s.start_time DESC",
            APPOINTMENT_VIEW_SQL
        );
        let views = sqlx::query_as::<_, AppointmentView>(&sql)
            .bind(patient_id)
            .fetch_all(&self.db)
            .await?;

        Ok(views)
    }

    /// Admin listing, optionally narrowed to one hospital and one date.
    pub async fn get_all_appointments(
        &self,
        filter: HospitalFilter,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AppointmentView>, AppointmentError> {
        let mut sql = format!("{} WHERE 1 = 1", APPOINTMENT_VIEW_SQL);
        if matches!(filter, HospitalFilter::Specific(_)) {
            sql.push_str(" AND d.hospital_id = ?");
        }
        if date.is_some() {
            sql.push_str(" AND s.date = ?");
        }
        sql.push_str(" ORDER BY s.date, s.start_time");

        let mut query = sqlx::query_as::<_, AppointmentView>(&sql);
        if let HospitalFilter::Specific(hospital_id) = filter {
            query = query.bind(hospital_id);
        }
        if let Some(date) = date {
            query = query.bind(date);
        }

        let views = query.fetch_all(&self.db).await?;
        Ok(views)
    }

    async fn fetch_view(&self, appointment_id: i64) -> Result<AppointmentView, AppointmentError> {
        let sql = format!("{} WHERE a.id = ?", APPOINTMENT_VIEW_SQL);
        sqlx::query_as::<_, AppointmentView>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppointmentError::NotFound)
    }
}
