use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;

use super::availability::{Availability, ConflictInfo};
use crate::formats::{clock_time, iso_date};

fn default_duration() -> i32 {
    super::DEFAULT_DURATION_MINUTES
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub barber_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "clock_time")]
    pub start_time: Time,
    pub service: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub barber_id: Option<Uuid>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(default, with = "clock_time::option")]
    pub start_time: Option<Time>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub barber_id: Option<Uuid>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "clock_time")]
    pub start_time: Time,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictInfo>,
}

impl From<Availability> for AvailabilityResponse {
    fn from(a: Availability) -> Self {
        let available = a.is_available();
        let conflict = match a {
            Availability::Available => None,
            Availability::Conflict(info) => Some(info),
        };
        Self { available, conflict }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}
