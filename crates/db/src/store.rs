//! # Booking Store
//!
//! [`BookingStore`] is the persistence seam the API talks to. [`PgStore`]
//! backs it with Postgres through the functions in [`crate::repositories`];
//! [`crate::memory::InMemoryStore`] provides the same contract in process.
//!
//! Every implementation must hold this invariant: at most one appointment
//! that is not `Cancelled` exists per `(counselor, date, time)`, and a
//! `create_appointment` that would break it fails with
//! [`BookingError::Conflict`].

use async_trait::async_trait;
use counselbook_core::{
    errors::{BookingError, BookingResult},
    models::{
        appointment::{Appointment, AppointmentStatus, CounselorAppointment, StudentAppointment},
        directory::{Counselor, User},
        slot::{CalendarDay, TimeSlot},
    },
};
use uuid::Uuid;

use crate::{repositories, DbPool};

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_user(&self, name: String, email: String) -> BookingResult<User>;

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>>;

    async fn create_counselor(
        &self,
        name: String,
        specialization: Option<String>,
    ) -> BookingResult<Counselor>;

    async fn get_counselor(&self, id: Uuid) -> BookingResult<Option<Counselor>>;

    async fn list_counselors(&self) -> BookingResult<Vec<Counselor>>;

    /// Inserts a new `Pending` appointment, or fails with `Conflict` if the
    /// slot is already held by a live booking.
    async fn create_appointment(
        &self,
        student_id: Uuid,
        counselor_id: Uuid,
        date: CalendarDay,
        time: TimeSlot,
    ) -> BookingResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>>;

    async fn appointments_for_student(
        &self,
        student_id: Uuid,
    ) -> BookingResult<Vec<StudentAppointment>>;

    async fn appointments_for_counselor(
        &self,
        counselor_id: Uuid,
    ) -> BookingResult<Vec<CounselorAppointment>>;

    /// All of a counselor's appointments on `date`, whatever their status.
    async fn appointments_on_day(
        &self,
        counselor_id: Uuid,
        date: CalendarDay,
    ) -> BookingResult<Vec<Appointment>>;

    /// Compare-and-set on the status column. `None` means nothing matched:
    /// either the id is unknown or the status is no longer `expected`.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> BookingResult<Option<Appointment>>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(report: &eyre::Report) -> bool {
    match report.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(err)) => err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn create_user(&self, name: String, email: String) -> BookingResult<User> {
        match repositories::user::create_user(&self.pool, &name, &email).await {
            Ok(row) => Ok(row.into()),
            Err(report) if is_unique_violation(&report) => Err(BookingError::Conflict(format!(
                "A user with email {email} already exists"
            ))),
            Err(report) => Err(BookingError::Database(report)),
        }
    }

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>> {
        let row = repositories::user::get_user_by_id(&self.pool, id).await?;
        Ok(row.map(Into::into))
    }

    async fn create_counselor(
        &self,
        name: String,
        specialization: Option<String>,
    ) -> BookingResult<Counselor> {
        let row =
            repositories::counselor::create_counselor(&self.pool, &name, specialization.as_deref())
                .await?;
        Ok(row.into())
    }

    async fn get_counselor(&self, id: Uuid) -> BookingResult<Option<Counselor>> {
        let row = repositories::counselor::get_counselor_by_id(&self.pool, id).await?;
        Ok(row.map(Into::into))
    }

    async fn list_counselors(&self) -> BookingResult<Vec<Counselor>> {
        let rows = repositories::counselor::list_counselors(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        student_id: Uuid,
        counselor_id: Uuid,
        date: CalendarDay,
        time: TimeSlot,
    ) -> BookingResult<Appointment> {
        let result = repositories::appointment::create_appointment(
            &self.pool,
            student_id,
            counselor_id,
            date.date(),
            time.label(),
        )
        .await;

        match result {
            Ok(row) => Ok(Appointment::try_from(row)?),
            Err(report) if is_unique_violation(&report) => {
                tracing::info!(
                    "Rejected double booking: counselor={}, date={}, time={}",
                    counselor_id, date, time
                );
                Err(BookingError::Conflict(format!(
                    "Slot {time} on {date} is already booked for this counselor"
                )))
            }
            Err(report) => Err(BookingError::Database(report)),
        }
    }

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        let row = repositories::appointment::get_appointment_by_id(&self.pool, id).await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn appointments_for_student(
        &self,
        student_id: Uuid,
    ) -> BookingResult<Vec<StudentAppointment>> {
        let rows = repositories::appointment::get_appointments_by_student(&self.pool, student_id)
            .await?;
        let appointments = rows
            .into_iter()
            .map(StudentAppointment::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(appointments)
    }

    async fn appointments_for_counselor(
        &self,
        counselor_id: Uuid,
    ) -> BookingResult<Vec<CounselorAppointment>> {
        let rows =
            repositories::appointment::get_appointments_by_counselor(&self.pool, counselor_id)
                .await?;
        let appointments = rows
            .into_iter()
            .map(CounselorAppointment::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(appointments)
    }

    async fn appointments_on_day(
        &self,
        counselor_id: Uuid,
        date: CalendarDay,
    ) -> BookingResult<Vec<Appointment>> {
        let rows =
            repositories::appointment::get_appointments_on_day(&self.pool, counselor_id, date.date())
                .await?;
        let appointments = rows
            .into_iter()
            .map(Appointment::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(appointments)
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> BookingResult<Option<Appointment>> {
        let row = repositories::appointment::update_appointment_status(
            &self.pool,
            id,
            expected.as_str(),
            next.as_str(),
        )
        .await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }
}
