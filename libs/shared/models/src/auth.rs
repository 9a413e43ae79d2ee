use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub role: Option<String>,
    pub hospital_id: Option<i64>,
    pub iat: Option<u64>,
}

/// Caller role, decided once per request from the token claims and passed
/// explicitly into every scoped query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    HospitalAdmin,
    SuperAdmin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Patient" => Some(Role::Patient),
            "HospitalAdmin" => Some(Role::HospitalAdmin),
            "SuperAdmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// Authenticated caller identity, inserted into request extensions by the
/// auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    /// Set for hospital admins; `None` for patients and the super admin.
    pub hospital_id: Option<i64>,
}
