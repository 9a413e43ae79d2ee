mod common;

use assert_matches::assert_matches;

use appointment_cell::models::{AppointmentError, HospitalFilter};
use appointment_cell::services::AppointmentService;
use common::*;
use shared_models::auth::{AuthUser, Role};

fn patient(id: i64) -> AuthUser {
    AuthUser {
        id,
        role: Role::Patient,
        hospital_id: None,
    }
}

fn hospital_admin(id: i64, hospital_id: i64) -> AuthUser {
    AuthUser {
        id,
        role: Role::HospitalAdmin,
        hospital_id: Some(hospital_id),
    }
}

fn super_admin(id: i64) -> AuthUser {
    AuthUser {
        id,
        role: Role::SuperAdmin,
        hospital_id: None,
    }
}

/// Two hospitals, one booked appointment in each. Returns
/// (pool, patient_a, appointment_a, hospital_a, hospital_b).
async fn two_hospital_fixture() -> (sqlx::SqlitePool, i64, i64, i64, i64) {
    let pool = test_pool().await;
    let hospital_a = seed_hospital(&pool, "Mzuzu Central").await;
    let hospital_b = seed_hospital(&pool, "Karonga District").await;
    let doctor_a = seed_doctor(&pool, hospital_a, "Dr. Banda").await;
    let doctor_b = seed_doctor(&pool, hospital_b, "Dr. Mwale").await;
    let patient_a = seed_patient(&pool, "Chisomo Phiri").await;
    let patient_b = seed_patient(&pool, "Mary Gondwe").await;
    let slot_a = seed_slot(&pool, doctor_a, "2025-06-02", "09:00", "09:15", "InPerson").await;
    let slot_b = seed_slot(&pool, doctor_b, "2025-06-03", "10:00", "10:15", "Video").await;

    let service = AppointmentService::with_pool(pool.clone());
    let appointment_a = service.book(patient_a, slot_a, None).await.unwrap();
    service.book(patient_b, slot_b, None).await.unwrap();

    (pool, patient_a, appointment_a.id, hospital_a, hospital_b)
}

#[tokio::test]
async fn patient_can_read_own_appointment() {
    let (pool, patient_a, appointment_a, _, _) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    let view = service
        .get_appointment(appointment_a, &patient(patient_a))
        .await
        .unwrap();
    assert_eq!(view.id, appointment_a);
}

#[tokio::test]
async fn foreign_appointment_reads_as_not_found_for_patients() {
    let (pool, patient_a, appointment_a, _, _) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    // Existence must not leak to other patients.
    let result = service
        .get_appointment(appointment_a, &patient(patient_a + 100))
        .await;
    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn hospital_admin_scope_is_their_own_hospital() {
    let (pool, _, appointment_a, hospital_a, hospital_b) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    let own = service
        .get_appointment(appointment_a, &hospital_admin(500, hospital_a))
        .await;
    assert!(own.is_ok());

    let foreign = service
        .get_appointment(appointment_a, &hospital_admin(501, hospital_b))
        .await;
    assert_matches!(foreign, Err(AppointmentError::Forbidden));
}

#[tokio::test]
async fn super_admin_reads_any_appointment() {
    let (pool, _, appointment_a, _, _) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    let view = service
        .get_appointment(appointment_a, &super_admin(1))
        .await
        .unwrap();
    assert_eq!(view.id, appointment_a);
}

#[tokio::test]
async fn missing_appointment_is_not_found_for_everyone() {
    let (pool, patient_a, _, hospital_a, _) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    assert_matches!(
        service.get_appointment(9999, &patient(patient_a)).await,
        Err(AppointmentError::NotFound)
    );
    assert_matches!(
        service
            .get_appointment(9999, &hospital_admin(500, hospital_a))
            .await,
        Err(AppointmentError::NotFound)
    );
    assert_matches!(
        service.get_appointment(9999, &super_admin(1)).await,
        Err(AppointmentError::NotFound)
    );
}

#[tokio::test]
async fn my_appointments_lists_only_own_newest_first() {
    let pool = test_pool().await;
    let hospital = seed_hospital(&pool, "Mzuzu Central").await;
    let doctor = seed_doctor(&pool, hospital, "Dr. Banda").await;
    let me = seed_patient(&pool, "Chisomo Phiri").await;
    let someone_else = seed_patient(&pool, "Mary Gondwe").await;
    let early = seed_slot(&pool, doctor, "2025-06-02", "09:00", "09:15", "InPerson").await;
    let late = seed_slot(&pool, doctor, "2025-06-09", "09:00", "09:15", "InPerson").await;
    let other = seed_slot(&pool, doctor, "2025-06-02", "10:00", "10:15", "InPerson").await;

    let service = AppointmentService::with_pool(pool.clone());
    service.book(me, early, None).await.unwrap();
    service.book(me, late, None).await.unwrap();
    service.book(someone_else, other, None).await.unwrap();

    let mine = service.get_my_appointments(me).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].slot_id, late);
    assert_eq!(mine[1].slot_id, early);
}

#[tokio::test]
async fn admin_listing_filters_by_hospital_and_date() {
    let (pool, _, _, hospital_a, hospital_b) = two_hospital_fixture().await;
    let service = AppointmentService::with_pool(pool);

    let all = service
        .get_all_appointments(HospitalFilter::All, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let only_a = service
        .get_all_appointments(HospitalFilter::Specific(hospital_a), None)
        .await
        .unwrap();
    assert_eq!(only_a.len(), 1);
    assert_eq!(only_a[0].hospital_id, hospital_a);

    let b_on_date = service
        .get_all_appointments(HospitalFilter::Specific(hospital_b), Some(d("2025-06-03")))
        .await
        .unwrap();
    assert_eq!(b_on_date.len(), 1);

    let b_wrong_date = service
        .get_all_appointments(HospitalFilter::Specific(hospital_b), Some(d("2025-06-02")))
        .await
        .unwrap();
    assert!(b_wrong_date.is_empty());
}
