use serde::{Deserialize, Serialize};

/// Request body for user registration.
///
/// Fields default to empty strings so a missing field is rejected as
/// invalid input rather than as a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Response returned after successful login. Confirmation only; no token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub email: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}
