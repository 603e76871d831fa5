use async_trait::async_trait;
use counselbook_core::{
    errors::BookingResult,
    models::{
        appointment::{Appointment, AppointmentStatus, CounselorAppointment, StudentAppointment},
        directory::{Counselor, User},
        slot::{CalendarDay, TimeSlot},
    },
};
use mockall::mock;
use uuid::Uuid;

use crate::store::BookingStore;

// Mock store for handler tests
mock! {
    pub Store {}

    #[async_trait]
    impl BookingStore for Store {
        async fn create_user(&self, name: String, email: String) -> BookingResult<User>;

        async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>>;

        async fn create_counselor(
            &self,
            name: String,
            specialization: Option<String>,
        ) -> BookingResult<Counselor>;

        async fn get_counselor(&self, id: Uuid) -> BookingResult<Option<Counselor>>;

        async fn list_counselors(&self) -> BookingResult<Vec<Counselor>>;

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

        async fn appointments_on_day(
            &self,
            counselor_id: Uuid,
            date: CalendarDay,
        ) -> BookingResult<Vec<Appointment>>;

        async fn update_appointment_status(
            &self,
            id: Uuid,
            expected: AppointmentStatus,
            next: AppointmentStatus,
        ) -> BookingResult<Option<Appointment>>;
    }
}
