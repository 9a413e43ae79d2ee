// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a consultation is delivered. Stored as-is in the database
/// ('InPerson' / 'Video') and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ConsultationType {
    InPerson,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

/// A doctor's recurring weekly availability pattern. `day_of_week` uses
/// 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SlotTemplate {
    pub id: i64,
    pub doctor_id: i64,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub consultation_type: ConsultationType,
    pub duration_minutes: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A free slot enriched with doctor and hospital display fields, as
/// shown on the search surface.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SlotView {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub hospital_id: i64,
    pub hospital_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub consultation_type: ConsultationType,
}

/// An appointment hydrated with slot timing plus doctor, hospital and
/// patient display fields. Every read surface returns this shape.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppointmentView {
    pub id: i64,
    pub slot_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub consultation_type: ConsultationType,
    pub chief_complaint: Option<String>,
    pub status: AppointmentStatus,
    pub video_meeting_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub hospital_id: i64,
    pub hospital_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub slot_id: i64,
    pub chief_complaint: Option<String>,
}

/// Partial update. A present `slot_id` requests a reschedule onto that
/// slot; `chief_complaint` replaces the stored value when present.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub chief_complaint: Option<String>,
    pub slot_id: Option<i64>,
}

/// Hospital scope for admin listings. Super admins see everything
/// unless they narrow to one hospital; hospital admins are always
/// pinned to their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HospitalFilter {
    All,
    Specific(i64),
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot is not available")]
    SlotNotAvailable,

    #[error("Appointment cannot be modified")]
    NotModifiable,

    #[error("Not allowed to access this appointment")]
    Forbidden,

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AppointmentError {
    fn from(e: sqlx::Error) -> Self {
        AppointmentError::Database(e.to_string())
    }
}
