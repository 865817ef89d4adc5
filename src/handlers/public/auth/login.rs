// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /login - Exchange credentials for a bearer token
///
/// Credentials are not checked against any user store; any well-formed body
/// receives a token whose subject is `username`.
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(login) = payload.map_err(|e| {
        tracing::debug!("Rejected login body: {}", e.body_text());
        ApiError::bad_request("Invalid input")
    })?;

    let token = state.tokens.issue(&login.username)?;
    tracing::info!(username = %login.username, "issued token");

    Ok(Json(json!({ "token": token })))
}
