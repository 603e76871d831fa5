use chrono::{DateTime, NaiveDate, Utc};
use counselbook_core::models::{
    appointment::{Appointment, AppointmentStatus, CounselorAppointment, StudentAppointment},
    directory::{Counselor, User},
    slot::TimeSlot,
};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCounselor {
    pub id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
    pub created_at: DateTime<Utc>,
}

// `time` and `status` are stored as text and checked by the schema; they are
// parsed back into their enums when leaving the data layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub counselor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment row joined with the display name of the other party.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentWithName {
    #[sqlx(flatten)]
    pub appointment: DbAppointment,
    pub party_name: String,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

impl From<DbCounselor> for Counselor {
    fn from(row: DbCounselor) -> Self {
        Counselor {
            id: row.id,
            name: row.name,
            specialization: row.specialization,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let time = row
            .time
            .parse::<TimeSlot>()
            .wrap_err_with(|| format!("Appointment {} has a corrupt time slot", row.id))?;
        let status = row
            .status
            .parse::<AppointmentStatus>()
            .wrap_err_with(|| format!("Appointment {} has a corrupt status", row.id))?;

        Ok(Appointment {
            id: row.id,
            student_id: row.student_id,
            counselor_id: row.counselor_id,
            date: row.date.into(),
            time,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbAppointmentWithName> for StudentAppointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointmentWithName) -> Result<Self> {
        Ok(StudentAppointment {
            appointment: row.appointment.try_into()?,
            counselor_name: row.party_name,
        })
    }
}

impl TryFrom<DbAppointmentWithName> for CounselorAppointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointmentWithName) -> Result<Self> {
        Ok(CounselorAppointment {
            appointment: row.appointment.try_into()?,
            student_name: row.party_name,
        })
    }
}
