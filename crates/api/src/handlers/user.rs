use axum::{extract::State, http::StatusCode, Json};
use counselbook_core::{
    errors::BookingError,
    lifecycle,
    models::directory::{CreateUserRequest, User},
};
use std::sync::Arc;

use crate::{
    middleware::{
        auth::Caller,
        error_handling::AppError,
        extract::AppJson,
    },
    ApiState,
};

/// Registers a student profile. Credentials live with the upstream
/// identity provider; this only records the name shown to counselors.
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    lifecycle::require_admin(&actor)?;

    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError(BookingError::Validation(
            "User name must not be empty".to_string(),
        )));
    }
    if !email.contains('@') {
        return Err(AppError(BookingError::Validation(format!(
            "Invalid email address: {}",
            payload.email
        ))));
    }

    let user = state.store.create_user(name.to_string(), email).await?;

    tracing::info!("User created: id={}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}
