//! Overlap detection for barber appointments.
//!
//! An appointment occupies the half-open interval `[start, start + duration)`
//! on its date. A candidate slot is available when no occupying appointment of
//! the same barber on the same date intersects it. The check is a pure
//! function over an already-fetched snapshot: fetching and locking belong to
//! the booking workflow in [`super::services`].

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use time::{Date, Duration, Time};
use uuid::Uuid;

use super::repo_types::Appointment;
use crate::formats::clock_time;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;

/// The slot someone wants to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub barber_id: Uuid,
    pub date: Date,
    pub start_time: Time,
    pub duration_minutes: i32,
}

/// Details of the appointment that blocks a candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictInfo {
    pub appointment_id: Uuid,
    #[serde(with = "clock_time")]
    pub start: Time,
    #[serde(with = "clock_time")]
    pub end: Time,
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Conflict(ConflictInfo),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("duration must be a positive number of minutes, got {0}")]
    NonPositiveDuration(i32),
}

/// Which appointment statuses leave the barber free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    inactive: HashSet<String>,
}

impl StatusPolicy {
    pub fn new<I, S>(inactive: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inactive: inactive
                .into_iter()
                .map(|s| s.into().trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether an appointment with this status blocks its interval.
    pub fn occupies(&self, status: &str) -> bool {
        !self.inactive.contains(&status.trim().to_lowercase())
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::new([super::STATUS_CANCELLED])
    }
}

fn nanos_of_day(t: Time) -> i64 {
    let (h, m, sec, nano) = t.as_hms_nano();
    ((i64::from(h) * 60 + i64::from(m)) * 60 + i64::from(sec)) * NANOS_PER_SECOND
        + i64::from(nano)
}

/// Half-open `[start, end)` in nanoseconds since midnight, keeping seconds.
/// `end` may exceed a day.
fn interval(start: Time, duration_minutes: i32) -> (i64, i64) {
    let s = nanos_of_day(start);
    (s, s + i64::from(duration_minutes) * NANOS_PER_MINUTE)
}

fn overlaps(a: (i64, i64), b: (i64, i64)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

/// Decide whether `slot` can be booked given `existing`.
///
/// Appointments of other barbers, other dates or with a non-occupying status
/// are ignored. When several appointments overlap, the first one in the order
/// of `existing` is reported, so callers should pass a stable order.
pub fn check_availability(
    slot: &Slot,
    existing: &[Appointment],
    policy: &StatusPolicy,
) -> Result<Availability, AvailabilityError> {
    if slot.duration_minutes <= 0 {
        return Err(AvailabilityError::NonPositiveDuration(slot.duration_minutes));
    }

    let candidate = interval(slot.start_time, slot.duration_minutes);

    let conflict = existing
        .iter()
        .filter(|a| a.barber_id == slot.barber_id && a.date == slot.date)
        .filter(|a| policy.occupies(&a.status))
        .find(|a| overlaps(candidate, interval(a.start_time, a.duration_minutes)));

    Ok(match conflict {
        Some(a) => Availability::Conflict(ConflictInfo {
            appointment_id: a.id,
            start: a.start_time,
            end: a.start_time + Duration::minutes(i64::from(a.duration_minutes)),
            service: a.service.clone(),
        }),
        None => Availability::Available,
    })
}
