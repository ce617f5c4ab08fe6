use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Walk-in customer kept for the front desk.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Client>> {
    let rows = sqlx::query_as::<_, Client>(
        "SELECT id, name, phone, created_at FROM clients ORDER BY name, id",
    )
    .fetch_all(db)
    .await
    .context("list clients")?;
    Ok(rows)
}

pub async fn create(db: &PgPool, name: &str, phone: Option<&str>) -> anyhow::Result<Client> {
    let row = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (name, phone)
        VALUES ($1, $2)
        RETURNING id, name, phone, created_at
        "#,
    )
    .bind(name)
    .bind(phone)
    .fetch_one(db)
    .await
    .context("insert client")?;
    Ok(row)
}
