use serde::{Deserialize, Serialize};

use crate::users::dto::AccountBody;

/// Body for POST /auth/register. Missing fields deserialize to empty
/// strings and fail the non-empty checks in the handler.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body for POST /auth/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login: the public account plus a bearer token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub account: AccountBody,
    pub token: String,
}
