use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::password;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let hash = password::hash_password(&payload.password)?;
    let user_id = state
        .store
        .create_user(username, payload.email.as_deref(), &hash)
        .await?;

    tracing::info!("created user {} (id {})", username, user_id);
    Ok((StatusCode::CREATED, Json(json!({"message": "User created"}))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .find_user(payload.username.trim())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let access = state.tokens.issue(user.id, &user.username)?;
    Ok(Json(json!({"access": access})))
}
