//! Status transitions for a single reservation.
//!
//! Every function checks who is acting first, then whether the move is allowed, and returns the
//! new state without touching storage.

use chrono::NaiveDate;

use super::{BookingError, DateRange, Rating, ReservationStatus, Result, validation};
use crate::types::{ReservationId, UserId};

/// The parts of a stored reservation the lifecycle rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationSnapshot {
    pub id: ReservationId,
    pub owner_id: UserId,
    pub room_manager_id: UserId,
    pub status: ReservationStatus,
    pub dates: DateRange,
    pub rating: Option<i16>,
}

impl ReservationSnapshot {
    fn require_owner(&self, actor: UserId, action: &'static str) -> Result<()> {
        if actor != self.owner_id {
            return Err(BookingError::NotOwner {
                reservation_id: self.id,
                action,
            });
        }
        Ok(())
    }
}

/// Apply a room manager's decision.
///
/// `confirmed` must hold the other confirmed ranges on the room; it is only consulted when a
/// pending reservation is being confirmed.
pub fn confirm(
    reservation: &ReservationSnapshot,
    actor: UserId,
    decision: ReservationStatus,
    confirmed: &[DateRange],
) -> Result<ReservationStatus> {
    if actor != reservation.room_manager_id {
        return Err(BookingError::NotRoomManager {
            reservation_id: reservation.id,
        });
    }
    if decision == ReservationStatus::Pending {
        return Err(BookingError::InvalidDecision { to: decision });
    }
    if reservation.status.is_terminal() {
        return Err(BookingError::InvalidTransition {
            from: reservation.status,
            to: decision,
        });
    }

    match (reservation.status, decision) {
        (ReservationStatus::Pending, ReservationStatus::Confirmed) => {
            validation::ensure_available(&reservation.dates, confirmed)?;
            Ok(decision)
        }
        (ReservationStatus::Pending, _) => Ok(decision),
        (ReservationStatus::Confirmed, ReservationStatus::Cancelled) => Ok(decision),
        (from, to) => Err(BookingError::InvalidTransition { from, to }),
    }
}

/// Owner cancels a pending or confirmed reservation.
pub fn cancel(reservation: &ReservationSnapshot, actor: UserId) -> Result<ReservationStatus> {
    reservation.require_owner(actor, "cancel")?;
    if reservation.status.is_terminal() {
        return Err(BookingError::InvalidTransition {
            from: reservation.status,
            to: ReservationStatus::Cancelled,
        });
    }
    Ok(ReservationStatus::Cancelled)
}

/// Owner rates a confirmed reservation once its last day is over.
pub fn finish(reservation: &ReservationSnapshot, actor: UserId, rating: i16, today: NaiveDate) -> Result<Rating> {
    reservation.require_owner(actor, "finish")?;
    let rating = Rating::try_from(rating)?;

    if reservation.status != ReservationStatus::Confirmed || !reservation.dates.has_ended(today) {
        return Err(BookingError::TrainingNotFinished);
    }
    if reservation.rating.is_some() {
        return Err(BookingError::AlreadyRated);
    }
    Ok(rating)
}

/// Owner edits the details of a reservation still waiting for a decision.
pub fn ensure_editable(reservation: &ReservationSnapshot, actor: UserId) -> Result<()> {
    reservation.require_owner(actor, "change")?;
    if reservation.status != ReservationStatus::Pending {
        return Err(BookingError::NotEditable {
            status: reservation.status,
        });
    }
    Ok(())
}

/// The room password is only shown to the owner, and only once the reservation is confirmed.
pub fn password_visible_to(owner_id: UserId, status: ReservationStatus, viewer: UserId) -> bool {
    owner_id == viewer && status == ReservationStatus::Confirmed
}
