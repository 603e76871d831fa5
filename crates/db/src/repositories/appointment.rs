use crate::models::{DbAppointment, DbAppointmentWithName};
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Inserts a `Pending` appointment.
///
/// A second live booking for the same counselor slot is rejected by the
/// `uniq_active_counselor_slot` index; the resulting `sqlx::Error` is carried
/// inside the returned report.
pub async fn create_appointment(
    pool: &Pool<Postgres>,
    student_id: Uuid,
    counselor_id: Uuid,
    date: NaiveDate,
    time: &str,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, student={}, counselor={}, date={}, time={}",
        id, student_id, counselor_id, date, time
    );

    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (id, student_id, counselor_id, date, time, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'Pending', $6, $6)
        RETURNING id, student_id, counselor_id, date, time, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(student_id)
    .bind(counselor_id)
    .bind(date)
    .bind(time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, student_id, counselor_id, date, time, status, created_at, updated_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointments_by_student(
    pool: &Pool<Postgres>,
    student_id: Uuid,
) -> Result<Vec<DbAppointmentWithName>> {
    let appointments = sqlx::query_as::<_, DbAppointmentWithName>(
        r#"
        SELECT a.id, a.student_id, a.counselor_id, a.date, a.time, a.status,
               a.created_at, a.updated_at, c.name AS party_name
        FROM appointments a
        JOIN counselors c ON c.id = a.counselor_id
        WHERE a.student_id = $1
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_appointments_by_counselor(
    pool: &Pool<Postgres>,
    counselor_id: Uuid,
) -> Result<Vec<DbAppointmentWithName>> {
    let appointments = sqlx::query_as::<_, DbAppointmentWithName>(
        r#"
        SELECT a.id, a.student_id, a.counselor_id, a.date, a.time, a.status,
               a.created_at, a.updated_at, u.name AS party_name
        FROM appointments a
        JOIN users u ON u.id = a.student_id
        WHERE a.counselor_id = $1
        "#,
    )
    .bind(counselor_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_appointments_on_day(
    pool: &Pool<Postgres>,
    counselor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, student_id, counselor_id, date, time, status, created_at, updated_at
        FROM appointments
        WHERE counselor_id = $1 AND date = $2
        "#,
    )
    .bind(counselor_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Moves an appointment from `expected` to `next`.
///
/// Returns `None` when the row is missing or its status is no longer
/// `expected`.
pub async fn update_appointment_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    expected: &str,
    next: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = $3, updated_at = $4
        WHERE id = $1 AND status = $2
        RETURNING id, student_id, counselor_id, date, time, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(expected)
    .bind(next)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}
