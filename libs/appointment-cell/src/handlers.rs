// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, ConsultationType, HospitalFilter,
    UpdateAppointmentRequest,
};
use crate::services::AppointmentService;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub consultation_type: Option<ConsultationType>,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub hospital_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

fn map_err(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::SlotNotAvailable => {
            AppError::BadRequest("Slot is not available".to_string())
        }
        AppointmentError::NotModifiable => {
            AppError::BadRequest("Appointment cannot be modified".to_string())
        }
        AppointmentError::Forbidden => {
            AppError::Forbidden("Not allowed to access this appointment".to_string())
        }
        AppointmentError::InvalidDateRange(msg) => AppError::BadRequest(msg),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

/// Public slot search. Generation happens lazily inside the service, so
/// the first search over a window is what creates its slots.
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let slots = service
        .get_available_slots(query.doctor_id, query.from, query.to, query.consultation_type)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service
        .book(user.id, payload.slot_id, payload.chief_complaint)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointments = service
        .get_my_appointments(user.id)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service
        .get_appointment(appointment_id, &user)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(appointment)))
}

/// Patient-side update. A present `slot_id` in the payload means a
/// reschedule; otherwise only the chief complaint changes.
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = match payload.slot_id {
        Some(slot_id) => {
            service
                .reschedule(appointment_id, user.id, slot_id, payload.chief_complaint)
                .await
        }
        None => {
            service
                .update_chief_complaint(appointment_id, user.id, payload.chief_complaint)
                .await
        }
    }
    .map_err(map_err)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service
        .cancel(appointment_id, user.id)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(appointment)))
}

/// Admin listing. Hospital admins are pinned to their own hospital;
/// a client-supplied hospital_id that disagrees is rejected instead of
/// silently overridden.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = match user.role {
        Role::Patient => {
            return Err(AppError::Forbidden(
                "Admin access required".to_string(),
            ))
        }
        Role::HospitalAdmin => {
            let own = user.hospital_id.ok_or_else(|| {
                AppError::Forbidden("Hospital admin has no hospital affiliation".to_string())
            })?;
            if let Some(requested) = query.hospital_id {
                if requested != own {
                    return Err(AppError::Forbidden(
                        "Cannot list another hospital's appointments".to_string(),
                    ));
                }
            }
            HospitalFilter::Specific(own)
        }
        Role::SuperAdmin => match query.hospital_id {
            Some(hospital_id) => HospitalFilter::Specific(hospital_id),
            None => HospitalFilter::All,
        },
    };

    let service = AppointmentService::new(&state);

    let appointments = service
        .get_all_appointments(filter, query.date)
        .await
        .map_err(map_err)?;

    Ok(Json(json!(appointments)))
}
