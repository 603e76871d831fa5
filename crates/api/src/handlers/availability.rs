//! # Availability Handlers
//!
//! Reports which of a counselor's fixed daily slots are still bookable on a
//! given day.
//!
//! ## Algorithm
//!
//! 1. Resolve the requested date to a [`CalendarDay`]. Plain dates and RFC 3339
//!    timestamps are both accepted; timestamps collapse to their UTC day.
//! 2. Fetch every appointment the counselor has on that day, in any status.
//! 3. Drop the slots those appointments occupy from the seven-slot schedule,
//!    keeping schedule order. Cancelled appointments count as occupying
//!    their slot unless the server runs with `RELEASE_CANCELLED_SLOTS=true`.

use axum::{
    extract::State,
    Json,
};
use counselbook_core::{
    availability::available_slots,
    errors::BookingError,
    models::{
        appointment::{AvailabilityQuery, AvailabilityResponse},
        slot::CalendarDay,
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{
        error_handling::AppError,
        extract::{AppPath, AppQuery},
    },
    ApiState,
};

/// Lists the free slots of a counselor on a day.
///
/// # Endpoint
///
/// ```text
/// GET /api/counselors/:id/availability?date=2024-06-10
/// ```
///
/// # Errors
///
/// * `Validation` - `date` missing or unparseable
/// * `NotFound` - no counselor with this id
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    AppPath(counselor_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = query
        .date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BookingError::Validation("Query parameter `date` is required".to_string()))?
        .parse::<CalendarDay>()?;

    state
        .store
        .get_counselor(counselor_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Counselor with ID {} not found", counselor_id))
        })?;

    let appointments = state.store.appointments_on_day(counselor_id, date).await?;
    let available = available_slots(&appointments, state.cancelled_slots);

    tracing::debug!(
        "Availability for counselor={} on {}: {} of 7 slots free",
        counselor_id,
        date,
        available.len()
    );

    Ok(Json(AvailabilityResponse {
        counselor_id,
        date,
        available,
    }))
}
