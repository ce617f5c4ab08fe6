use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::formats::{clock_time, iso_date};

/// Appointment record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "clock_time")]
    pub start_time: Time,
    pub status: String,
    pub service: Option<String>,
    pub duration_minutes: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Values for a row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub date: Date,
    pub start_time: Time,
    pub service: Option<String>,
    pub duration_minutes: i32,
}
