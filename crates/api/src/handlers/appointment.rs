//! # Appointment Handlers
//!
//! Booking, lookup, status transitions and per-party listings.
//!
//! Creating an appointment first checks the slot against the counselor's day
//! under the configured cancelled-slot policy, then inserts. The insert itself
//! is guarded by the store's uniqueness invariant, so two requests racing for
//! the same slot cannot both succeed even if both passed the first check.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use counselbook_core::{
    availability::is_slot_available,
    errors::BookingError,
    lifecycle,
    models::{
        appointment::{
            Appointment, AppointmentStatus, CounselorAppointment, CreateAppointmentRequest,
            StudentAppointment, UpdateStatusRequest,
        },
        slot::{CalendarDay, TimeSlot},
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    middleware::{
        auth::Caller,
        error_handling::AppError,
        extract::{AppJson, AppPath},
    },
    ApiState,
};

/// Validated form of [`CreateAppointmentRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBooking {
    pub counselor_id: Uuid,
    pub date: CalendarDay,
    pub time: TimeSlot,
}

impl TryFrom<CreateAppointmentRequest> for NewBooking {
    type Error = BookingError;

    fn try_from(request: CreateAppointmentRequest) -> Result<Self, Self::Error> {
        let present = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

        match (request.counselor_id, present(request.date), present(request.time)) {
            (Some(counselor_id), Some(date), Some(time)) => Ok(NewBooking {
                counselor_id,
                date: date.parse::<CalendarDay>()?,
                time: time.parse::<TimeSlot>()?,
            }),
            (counselor_id, date, time) => {
                let missing: Vec<&str> = [
                    ("counselor_id", counselor_id.is_none()),
                    ("date", date.is_none()),
                    ("time", time.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(BookingError::Validation(format!(
                    "Missing required field(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Books a slot for the calling student.
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// { "counselor_id": "...", "date": "2024-06-10", "time": "10:00 AM" }
/// ```
///
/// # Errors
///
/// * `Authorization` - caller is not a student
/// * `Validation` - a field is missing or malformed
/// * `NotFound` - the counselor or the calling student does not exist
/// * `Conflict` - the slot is already taken
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppJson(payload): AppJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    lifecycle::authorize_booking(&actor)?;
    let booking = NewBooking::try_from(payload)?;

    state
        .store
        .get_counselor(booking.counselor_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Counselor with ID {} not found", booking.counselor_id))
        })?;
    state
        .store
        .get_user(actor.id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Student with ID {} not found", actor.id)))?;

    let day = state
        .store
        .appointments_on_day(booking.counselor_id, booking.date)
        .await?;
    if !is_slot_available(&day, booking.time, state.cancelled_slots) {
        return Err(AppError(BookingError::Conflict(format!(
            "Slot {} on {} is not available",
            booking.time, booking.date
        ))));
    }

    let appointment = state
        .store
        .create_appointment(actor.id, booking.counselor_id, booking.date, booking.time)
        .await?;

    info!(
        "Appointment booked: id={}, student={}, counselor={}, date={}, time={}",
        appointment.id, appointment.student_id, appointment.counselor_id, appointment.date, appointment.time
    );

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

    lifecycle::authorize_view(&actor, &appointment)?;

    Ok(Json(appointment))
}

/// Moves an appointment to a new status.
///
/// # Endpoint
///
/// ```text
/// PUT /api/appointments/:id/status
/// { "status": "Confirmed" }
/// ```
///
/// # Errors
///
/// * `Validation` - status missing or not one of the four known values
/// * `NotFound` - no appointment with this id; nothing is modified
/// * `Authorization` - caller is not a party, or their role may not set this status
/// * `InvalidTransition` - the lifecycle does not allow this move
/// * `Conflict` - another request changed the status first
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let next = payload
        .status
        .as_deref()
        .ok_or_else(|| BookingError::Validation("Missing required field(s): status".to_string()))?
        .parse::<AppointmentStatus>()?;

    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

    lifecycle::authorize_transition(&actor, &appointment, next)?;

    let updated = state
        .store
        .update_appointment_status(id, appointment.status, next)
        .await?
        .ok_or_else(|| {
            BookingError::Conflict(format!(
                "Appointment {} changed status concurrently; reload and retry",
                id
            ))
        })?;

    info!(
        "Appointment status changed: id={}, {} -> {}, by {} {}",
        id, appointment.status, updated.status, actor.role, actor.id
    );

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn list_for_student(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppPath(student_id): AppPath<Uuid>,
) -> Result<Json<Vec<StudentAppointment>>, AppError> {
    lifecycle::authorize_student_listing(&actor, student_id)?;

    let appointments = state.store.appointments_for_student(student_id).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn list_for_counselor(
    State(state): State<Arc<ApiState>>,
    Caller(actor): Caller,
    AppPath(counselor_id): AppPath<Uuid>,
) -> Result<Json<Vec<CounselorAppointment>>, AppError> {
    lifecycle::authorize_counselor_listing(&actor, counselor_id)?;

    let appointments = state.store.appointments_for_counselor(counselor_id).await?;
    Ok(Json(appointments))
}
