use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{Appointment, NewAppointment};

const COLUMNS: &str =
    "id, user_id, barber_id, date, start_time, status, service, duration_minutes, created_at";

/// Advisory lock keys for a barber's day. Two bookings for the same
/// (barber, date) map to the same pair and serialize on it.
pub(crate) fn day_lock_keys(barber_id: Uuid, date: Date) -> (i32, i32) {
    let v = barber_id.as_u128();
    let folded = (v ^ (v >> 32) ^ (v >> 64) ^ (v >> 96)) as u32;
    (folded as i32, date.to_julian_day())
}

/// Take the transaction-scoped lock for a barber's day.
pub async fn lock_barber_day(
    tx: &mut Transaction<'_, Postgres>,
    barber_id: Uuid,
    date: Date,
) -> anyhow::Result<()> {
    let (k1, k2) = day_lock_keys(barber_id, date);
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(k1)
        .bind(k2)
        .execute(&mut **tx)
        .await
        .context("lock barber day")?;
    Ok(())
}

/// All appointments of a barber on a date, in booking order.
pub async fn list_for_barber_day<'e, E>(
    exec: E,
    barber_id: Uuid,
    date: Date,
) -> anyhow::Result<Vec<Appointment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM appointments
         WHERE barber_id = $1 AND date = $2
         ORDER BY start_time, created_at, id
        "#
    ))
    .bind(barber_id)
    .bind(date)
    .fetch_all(exec)
    .await
    .context("list appointments for barber day")?;
    Ok(rows)
}

pub async fn insert<'e, E>(exec: E, new: &NewAppointment, status: &str) -> anyhow::Result<Appointment>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        INSERT INTO appointments (user_id, barber_id, date, start_time, status, service, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(new.user_id)
    .bind(new.barber_id)
    .bind(new.date)
    .bind(new.start_time)
    .bind(status)
    .bind(new.service.as_deref())
    .bind(new.duration_minutes)
    .fetch_one(exec)
    .await
    .context("insert appointment")?;
    Ok(row)
}

pub async fn get<'e, E>(exec: E, id: Uuid) -> anyhow::Result<Option<Appointment>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, Appointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await
    .context("get appointment")?;
    Ok(row)
}

/// Same as [`get`] but locks the row until the transaction ends.
pub async fn get_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<Appointment>> {
    let row = sqlx::query_as::<_, Appointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .context("get appointment for update")?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    barber_id: Option<Uuid>,
    date: Option<Date>,
) -> anyhow::Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM appointments
         WHERE ($1::uuid IS NULL OR barber_id = $1)
           AND ($2::date IS NULL OR date = $2)
         ORDER BY date, start_time, created_at, id
        "#
    ))
    .bind(barber_id)
    .bind(date)
    .fetch_all(db)
    .await
    .context("list appointments")?;
    Ok(rows)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM appointments
         WHERE user_id = $1
         ORDER BY date, start_time, created_at, id
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list appointments by user")?;
    Ok(rows)
}

/// Persist every mutable column of `a`.
pub async fn update<'e, E>(exec: E, a: &Appointment) -> anyhow::Result<Appointment>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        UPDATE appointments
           SET barber_id = $2, date = $3, start_time = $4, status = $5,
               service = $6, duration_minutes = $7
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(a.id)
    .bind(a.barber_id)
    .bind(a.date)
    .bind(a.start_time)
    .bind(&a.status)
    .bind(a.service.as_deref())
    .bind(a.duration_minutes)
    .fetch_one(exec)
    .await
    .context("update appointment")?;
    Ok(row)
}

pub async fn delete<'e, E>(exec: E, id: Uuid) -> anyhow::Result<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let res = sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await
        .context("delete appointment")?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn lock_keys_are_stable_per_barber_day() {
        let barber = Uuid::new_v4();
        let day = date!(2025 - 12 - 16);
        assert_eq!(day_lock_keys(barber, day), day_lock_keys(barber, day));
    }

    #[test]
    fn lock_keys_differ_across_days() {
        let barber = Uuid::new_v4();
        let (a1, a2) = day_lock_keys(barber, date!(2025 - 12 - 16));
        let (b1, b2) = day_lock_keys(barber, date!(2025 - 12 - 17));
        assert_eq!(a1, b1);
        assert_ne!(a2, b2);
    }
}
