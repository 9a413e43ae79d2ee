// libs/directory-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub district: Option<String>,
}

/// Doctor identity joined with the owning hospital, the shape the slot and
/// appointment views hydrate from.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DoctorProfile {
    pub id: i64,
    pub full_name: String,
    pub hospital_id: i64,
    pub hospital_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PatientRecord {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
}
