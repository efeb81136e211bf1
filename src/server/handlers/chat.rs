use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// Runs the question through the pipeline and persists the exchange.
/// Pipeline failures come back inside the response string, so an
/// authenticated chat request always succeeds at the HTTP level.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &state.tokens)?;

    let message = payload.message.as_deref().unwrap_or("").trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message required".to_string()));
    }

    let response = state.pipeline.answer(message).await;
    state.store.add_record(user.id, message, &response).await?;

    Ok(Json(json!({"response": response})))
}

pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &state.tokens)?;

    let records = state.store.history_for_user(user.id).await?;
    let payload: Vec<Value> = records
        .into_iter()
        .map(|record| {
            json!({
                "message": record.message,
                "response": record.response,
                "created_at": record.created_at,
            })
        })
        .collect();

    Ok(Json(payload))
}
