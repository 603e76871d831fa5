use crate::models::DbCounselor;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_counselor(
    pool: &Pool<Postgres>,
    name: &str,
    specialization: Option<&str>,
) -> Result<DbCounselor> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let counselor = sqlx::query_as::<_, DbCounselor>(
        r#"
        INSERT INTO counselors (id, name, specialization, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, specialization, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(specialization)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Counselor created: id={}, name={}", counselor.id, counselor.name);
    Ok(counselor)
}

pub async fn get_counselor_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbCounselor>> {
    let counselor = sqlx::query_as::<_, DbCounselor>(
        r#"
        SELECT id, name, specialization, created_at
        FROM counselors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(counselor)
}

pub async fn list_counselors(pool: &Pool<Postgres>) -> Result<Vec<DbCounselor>> {
    let counselors = sqlx::query_as::<_, DbCounselor>(
        r#"
        SELECT id, name, specialization, created_at
        FROM counselors
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(counselors)
}
