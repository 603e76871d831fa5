//! # Availability Derivation
//!
//! A counselor's day is the fixed [`TimeSlot::ALL`] schedule. The free slots
//! for a day are that schedule minus the slots already taken by the
//! counselor's appointments on the same [`CalendarDay`](crate::models::slot::CalendarDay).
//!
//! Derivation is a pure function of the appointments handed in; fetching
//! them for the right counselor and day is the caller's job.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BookingError;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::slot::TimeSlot;

/// Whether a cancelled appointment still blocks its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelledSlotPolicy {
    /// Cancelled bookings keep occupying their slot.
    #[default]
    Occupy,
    /// Cancelled bookings free their slot.
    Release,
}

impl CancelledSlotPolicy {
    pub fn occupies(self, status: AppointmentStatus) -> bool {
        match status {
            AppointmentStatus::Cancelled => self == CancelledSlotPolicy::Occupy,
            _ => true,
        }
    }
}

impl FromStr for CancelledSlotPolicy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "occupy" | "false" | "0" | "no" => Ok(CancelledSlotPolicy::Occupy),
            "release" | "true" | "1" | "yes" => Ok(CancelledSlotPolicy::Release),
            other => Err(BookingError::Validation(format!(
                "Invalid cancelled slot policy: {other}"
            ))),
        }
    }
}

/// Slots from the day schedule that none of `appointments` occupies, in
/// schedule order.
///
/// `appointments` is expected to hold a single counselor's bookings for a
/// single day.
pub fn available_slots<'a, I>(appointments: I, policy: CancelledSlotPolicy) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let booked: HashSet<TimeSlot> = appointments
        .into_iter()
        .filter(|appointment| policy.occupies(appointment.status))
        .map(|appointment| appointment.time)
        .collect();

    TimeSlot::ALL
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}

/// Whether `slot` is free given the day's `appointments`.
pub fn is_slot_available<'a, I>(appointments: I, slot: TimeSlot, policy: CancelledSlotPolicy) -> bool
where
    I: IntoIterator<Item = &'a Appointment>,
{
    !appointments
        .into_iter()
        .any(|appointment| appointment.time == slot && policy.occupies(appointment.status))
}
