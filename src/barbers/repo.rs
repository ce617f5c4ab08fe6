use anyhow::Context;
use serde::Serialize;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Barber {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Barber>> {
    let rows = sqlx::query_as::<_, Barber>(
        "SELECT id, name, created_at FROM barbers ORDER BY name, id",
    )
    .fetch_all(db)
    .await
    .context("list barbers")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Barber>> {
    let row = sqlx::query_as::<_, Barber>("SELECT id, name, created_at FROM barbers WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get barber")?;
    Ok(row)
}

pub async fn exists<'e, E>(exec: E, id: Uuid) -> anyhow::Result<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let (found,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM barbers WHERE id = $1)")
        .bind(id)
        .fetch_one(exec)
        .await
        .context("barber exists")?;
    Ok(found)
}

pub async fn create(db: &PgPool, name: &str) -> anyhow::Result<Barber> {
    let row = sqlx::query_as::<_, Barber>(
        "INSERT INTO barbers (name) VALUES ($1) RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(db)
    .await
    .context("insert barber")?;
    Ok(row)
}
