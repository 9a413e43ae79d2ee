use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "sqlite::memory:".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            port: 0,
        }
    }
}

pub struct TestUser {
    pub id: i64,
    pub role: String,
    pub hospital_id: Option<i64>,
}

impl TestUser {
    pub fn patient(id: i64) -> Self {
        Self {
            id,
            role: "Patient".to_string(),
            hospital_id: None,
        }
    }

    pub fn hospital_admin(id: i64, hospital_id: i64) -> Self {
        Self {
            id,
            role: "HospitalAdmin".to_string(),
            hospital_id: Some(hospital_id),
        }
    }

    pub fn super_admin(id: i64) -> Self {
        Self {
            id,
            role: "SuperAdmin".to_string(),
            hospital_id: None,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id.to_string(),
            "role": user.role,
            "hospital_id": user.hospital_id,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
