//! # Booking Lifecycle
//!
//! Status transitions allowed for an appointment:
//!
//! ```text
//! Pending   -> Confirmed | Cancelled
//! Confirmed -> Completed | Cancelled
//! ```
//!
//! `Completed` and `Cancelled` are terminal. Who may request a transition is
//! decided by [`authorize_transition`] from the caller's [`Actor`].

use crate::errors::{BookingError, BookingResult};
use crate::models::actor::{Actor, Role};
use crate::models::appointment::{Appointment, AppointmentStatus};

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn allowed_transitions(self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Pending => &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
            AppointmentStatus::Confirmed => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Checks that `from -> to` is an edge of the lifecycle.
pub fn validate_transition(from: AppointmentStatus, to: AppointmentStatus) -> BookingResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(BookingError::InvalidTransition { from, to })
    }
}

/// Whether `actor` is allowed to see `appointment` at all.
pub fn is_party(actor: &Actor, appointment: &Appointment) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Student => actor.id == appointment.student_id,
        Role::Counselor => actor.id == appointment.counselor_id,
    }
}

/// Ensures `actor` may view `appointment`.
pub fn authorize_view(actor: &Actor, appointment: &Appointment) -> BookingResult<()> {
    if is_party(actor, appointment) {
        Ok(())
    } else {
        Err(BookingError::Authorization(
            "Caller is not a party to this appointment".to_string(),
        ))
    }
}

/// Full guard for moving `appointment` to `next` on behalf of `actor`.
///
/// Checks run in order: party access, lifecycle edge, role capability.
pub fn authorize_transition(
    actor: &Actor,
    appointment: &Appointment,
    next: AppointmentStatus,
) -> BookingResult<()> {
    authorize_view(actor, appointment)?;
    validate_transition(appointment.status, next)?;

    let permitted = match next {
        AppointmentStatus::Confirmed | AppointmentStatus::Completed => {
            matches!(actor.role, Role::Counselor | Role::Admin)
        }
        AppointmentStatus::Cancelled => matches!(actor.role, Role::Student | Role::Admin),
        AppointmentStatus::Pending => false,
    };

    if permitted {
        Ok(())
    } else {
        Err(BookingError::Authorization(format!(
            "Role {} may not set status {}",
            actor.role, next
        )))
    }
}

/// Ensures `actor` may create a booking. Only students book for themselves.
pub fn authorize_booking(actor: &Actor) -> BookingResult<()> {
    match actor.role {
        Role::Student => Ok(()),
        other => Err(BookingError::Authorization(format!(
            "Role {other} may not create appointments"
        ))),
    }
}

/// Ensures `actor` may list the appointments of the given student.
pub fn authorize_student_listing(actor: &Actor, student_id: uuid::Uuid) -> BookingResult<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Student if actor.id == student_id => Ok(()),
        _ => Err(BookingError::Authorization(
            "Caller may not list this student's appointments".to_string(),
        )),
    }
}

/// Ensures `actor` may list the appointments of the given counselor.
pub fn authorize_counselor_listing(actor: &Actor, counselor_id: uuid::Uuid) -> BookingResult<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Counselor if actor.id == counselor_id => Ok(()),
        _ => Err(BookingError::Authorization(
            "Caller may not list this counselor's appointments".to_string(),
        )),
    }
}

/// Ensures `actor` holds the admin role.
pub fn require_admin(actor: &Actor) -> BookingResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(BookingError::Authorization("Admin role required".to_string()))
    }
}
