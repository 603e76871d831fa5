use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use counselbook_core::{
    errors::BookingError,
    lifecycle,
    models::directory::{Counselor, CreateCounselorRequest},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{
        auth::Caller,
        error_handling::AppError,
        extract::{AppJson, AppPath},
    },
    ApiState,
};

#[axum::debug_handler]
pub async fn list_counselors(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Counselor>>, AppError> {
    let counselors = state.store.list_counselors().await?;
    Ok(Json(counselors))
}

#[axum::debug_handler]
pub async fn get_counselor(
    State(state): State<Arc<ApiState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Counselor>, AppError> {
    let counselor = state
        .store
        .get_counselor(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Counselor with ID {} not found", id)))?;

    Ok(Json(counselor))
}

/// Admin-only.
#[axum::debug_handler]
pub async fn create_counselor(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppJson(payload): AppJson<CreateCounselorRequest>,
) -> Result<(StatusCode, Json<Counselor>), AppError> {
    lifecycle::require_admin(&actor)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError(BookingError::Validation(
            "Counselor name must not be empty".to_string(),
        )));
    }
    let specialization = payload
        .specialization
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let counselor = state
        .store
        .create_counselor(name.to_string(), specialization)
        .await?;

    tracing::info!("Counselor created: id={}, name={}", counselor.id, counselor.name);
    Ok((StatusCode::CREATED, Json(counselor)))
}
