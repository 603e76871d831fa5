//! In-process [`BookingStore`] used by tests and local runs without Postgres.
//!
//! All state sits behind one `RwLock`, so the slot uniqueness check and the
//! insert that follows it happen under the same write guard.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use counselbook_core::{
    errors::{BookingError, BookingResult},
    models::{
        appointment::{Appointment, AppointmentStatus, CounselorAppointment, StudentAppointment},
        directory::{Counselor, User},
        slot::{CalendarDay, TimeSlot},
    },
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::BookingStore;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    counselors: HashMap<Uuid, Counselor>,
    appointments: HashMap<Uuid, Appointment>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn create_user(&self, name: String, email: String) -> BookingResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.email == email) {
            return Err(BookingError::Conflict(format!(
                "A user with email {email} already exists"
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_counselor(
        &self,
        name: String,
        specialization: Option<String>,
    ) -> BookingResult<Counselor> {
        let counselor = Counselor {
            id: Uuid::new_v4(),
            name,
            specialization,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .counselors
            .insert(counselor.id, counselor.clone());
        Ok(counselor)
    }

    async fn get_counselor(&self, id: Uuid) -> BookingResult<Option<Counselor>> {
        Ok(self.tables.read().await.counselors.get(&id).cloned())
    }

    async fn list_counselors(&self) -> BookingResult<Vec<Counselor>> {
        let tables = self.tables.read().await;
        let mut counselors: Vec<Counselor> = tables.counselors.values().cloned().collect();
        counselors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counselors)
    }

    async fn create_appointment(
        &self,
        student_id: Uuid,
        counselor_id: Uuid,
        date: CalendarDay,
        time: TimeSlot,
    ) -> BookingResult<Appointment> {
        let mut tables = self.tables.write().await;

        let taken = tables.appointments.values().any(|existing| {
            existing.counselor_id == counselor_id
                && existing.date == date
                && existing.time == time
                && existing.is_active()
        });
        if taken {
            return Err(BookingError::Conflict(format!(
                "Slot {time} on {date} is already booked for this counselor"
            )));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            student_id,
            counselor_id,
            date,
            time,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn appointments_for_student(
        &self,
        student_id: Uuid,
    ) -> BookingResult<Vec<StudentAppointment>> {
        let tables = self.tables.read().await;
        // Inner join semantics: rows whose counselor is unknown are skipped.
        let appointments = tables
            .appointments
            .values()
            .filter(|appointment| appointment.student_id == student_id)
            .filter_map(|appointment| {
                tables
                    .counselors
                    .get(&appointment.counselor_id)
                    .map(|counselor| StudentAppointment {
                        appointment: appointment.clone(),
                        counselor_name: counselor.name.clone(),
                    })
            })
            .collect();
        Ok(appointments)
    }

    async fn appointments_for_counselor(
        &self,
        counselor_id: Uuid,
    ) -> BookingResult<Vec<CounselorAppointment>> {
        let tables = self.tables.read().await;
        let appointments = tables
            .appointments
            .values()
            .filter(|appointment| appointment.counselor_id == counselor_id)
            .filter_map(|appointment| {
                tables
                    .users
                    .get(&appointment.student_id)
                    .map(|student| CounselorAppointment {
                        appointment: appointment.clone(),
                        student_name: student.name.clone(),
                    })
            })
            .collect();
        Ok(appointments)
    }

    async fn appointments_on_day(
        &self,
        counselor_id: Uuid,
        date: CalendarDay,
    ) -> BookingResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .values()
            .filter(|appointment| appointment.counselor_id == counselor_id && appointment.date == date)
            .cloned()
            .collect())
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> BookingResult<Option<Appointment>> {
        let mut tables = self.tables.write().await;
        match tables.appointments.get_mut(&id) {
            Some(appointment) if appointment.status == expected => {
                appointment.status = next;
                appointment.updated_at = Utc::now();
                Ok(Some(appointment.clone()))
            }
            _ => Ok(None),
        }
    }
}
