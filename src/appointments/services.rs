//! Booking workflow: fetch the barber's day, run the overlap check and write,
//! all inside one transaction holding the (barber, date) advisory lock.

use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    availability::{check_availability, Availability, AvailabilityError, Slot, StatusPolicy},
    dto::{CreateAppointmentRequest, UpdateAppointmentRequest},
    repo,
    repo_types::{Appointment, NewAppointment},
    STATUS_PENDING,
};
use crate::barbers::repo as barbers_repo;
use crate::error::{AppError, AppResult};

fn clean_label(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn ensure_positive(duration_minutes: i32) -> Result<(), AvailabilityError> {
    if duration_minutes <= 0 {
        return Err(AvailabilityError::NonPositiveDuration(duration_minutes));
    }
    Ok(())
}

fn reject_conflict(decision: Availability, slot: &Slot) -> AppResult<()> {
    match decision {
        Availability::Available => Ok(()),
        Availability::Conflict(info) => {
            warn!(
                barber_id = %slot.barber_id,
                date = %slot.date,
                start = %slot.start_time,
                conflicting = %info.appointment_id,
                "slot unavailable"
            );
            Err(AppError::SlotUnavailable(info))
        }
    }
}

/// Book a new appointment with status `pending`.
pub async fn book_appointment(
    db: &PgPool,
    policy: &StatusPolicy,
    user_id: Uuid,
    req: CreateAppointmentRequest,
) -> AppResult<Appointment> {
    ensure_positive(req.duration_minutes)?;

    let slot = Slot {
        barber_id: req.barber_id,
        date: req.date,
        start_time: req.start_time,
        duration_minutes: req.duration_minutes,
    };

    let mut tx = db.begin().await.map_err(anyhow::Error::from)?;
    repo::lock_barber_day(&mut tx, slot.barber_id, slot.date).await?;

    if !barbers_repo::exists(&mut *tx, slot.barber_id).await? {
        return Err(AppError::InvalidInput(format!(
            "unknown barber {}",
            slot.barber_id
        )));
    }

    let snapshot = repo::list_for_barber_day(&mut *tx, slot.barber_id, slot.date).await?;
    debug!(existing = snapshot.len(), "checking availability");
    reject_conflict(check_availability(&slot, &snapshot, policy)?, &slot)?;

    let new = NewAppointment {
        user_id,
        barber_id: slot.barber_id,
        date: slot.date,
        start_time: slot.start_time,
        service: clean_label(req.service),
        duration_minutes: slot.duration_minutes,
    };
    let created = repo::insert(&mut *tx, &new, STATUS_PENDING).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    info!(appointment_id = %created.id, barber_id = %created.barber_id, "appointment booked");
    Ok(created)
}

/// Apply `patch` to `current`. Returns the updated appointment and whether
/// the barber's occupied time may have changed.
pub(crate) fn apply_patch(
    current: &Appointment,
    patch: UpdateAppointmentRequest,
) -> Result<(Appointment, bool), AvailabilityError> {
    let mut next = current.clone();
    if let Some(b) = patch.barber_id {
        next.barber_id = b;
    }
    if let Some(d) = patch.date {
        next.date = d;
    }
    if let Some(t) = patch.start_time {
        next.start_time = t;
    }
    if let Some(d) = patch.duration_minutes {
        ensure_positive(d)?;
        next.duration_minutes = d;
    }
    if let Some(s) = patch.status {
        let s = s.trim().to_lowercase();
        if !s.is_empty() {
            next.status = s;
        }
    }
    if patch.service.is_some() {
        next.service = clean_label(patch.service);
    }

    let moved = next.barber_id != current.barber_id
        || next.date != current.date
        || next.start_time != current.start_time
        || next.duration_minutes != current.duration_minutes
        || next.status != current.status;
    Ok((next, moved))
}

/// Whether a patched appointment has to be checked against the barber's day.
pub(crate) fn needs_recheck(policy: &StatusPolicy, moved: bool, next: &Appointment) -> bool {
    moved && policy.occupies(&next.status)
}

fn slot_of(a: &Appointment) -> Slot {
    Slot {
        barber_id: a.barber_id,
        date: a.date,
        start_time: a.start_time,
        duration_minutes: a.duration_minutes,
    }
}

/// Check `next` against its day, ignoring the stored copy of itself.
pub(crate) fn recheck_against_day(
    next: &Appointment,
    day: Vec<Appointment>,
    policy: &StatusPolicy,
) -> Result<Availability, AvailabilityError> {
    let others: Vec<Appointment> = day.into_iter().filter(|a| a.id != next.id).collect();
    check_availability(&slot_of(next), &others, policy)
}

/// Update an appointment owned by `user_id`, re-checking the slot when the
/// change could make it overlap another booking.
pub async fn update_appointment(
    db: &PgPool,
    policy: &StatusPolicy,
    user_id: Uuid,
    id: Uuid,
    patch: UpdateAppointmentRequest,
) -> AppResult<Appointment> {
    let mut tx = db.begin().await.map_err(anyhow::Error::from)?;

    let current = repo::get_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
    if current.user_id != user_id {
        warn!(appointment_id = %id, %user_id, "update on foreign appointment");
        return Err(AppError::Forbidden("Not your appointment".into()));
    }

    let (next, moved) = apply_patch(&current, patch)?;

    if needs_recheck(policy, moved, &next) {
        repo::lock_barber_day(&mut tx, next.barber_id, next.date).await?;

        if next.barber_id != current.barber_id
            && !barbers_repo::exists(&mut *tx, next.barber_id).await?
        {
            return Err(AppError::InvalidInput(format!(
                "unknown barber {}",
                next.barber_id
            )));
        }

        let day = repo::list_for_barber_day(&mut *tx, next.barber_id, next.date).await?;
        reject_conflict(recheck_against_day(&next, day, policy)?, &slot_of(&next))?;
    }

    let updated = repo::update(&mut *tx, &next).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    info!(appointment_id = %updated.id, status = %updated.status, "appointment updated");
    Ok(updated)
}

pub async fn delete_appointment(db: &PgPool, user_id: Uuid, id: Uuid) -> AppResult<()> {
    let mut tx = db.begin().await.map_err(anyhow::Error::from)?;

    let current = repo::get_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
    if current.user_id != user_id {
        warn!(appointment_id = %id, %user_id, "delete on foreign appointment");
        return Err(AppError::Forbidden("Not your appointment".into()));
    }

    repo::delete(&mut *tx, id).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    info!(appointment_id = %id, "appointment deleted");
    Ok(())
}
