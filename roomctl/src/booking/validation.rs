//! Reservation validator.
//!
//! Callers pass in the confirmed ranges already booked on the room (normally the result of
//! [`crate::db::handlers::Reservations::confirmed_in_window`]); the checks here decide.

use chrono::NaiveDate;

use super::{BookingError, DateRange, Result};

/// Maximum length of a reservation's training label.
pub const MAX_TRAINING_LEN: usize = 156;

/// Maximum length of a room name.
pub const MAX_ROOM_NAME_LEN: usize = 255;

/// Reject a start date before `today`. Only applies when a reservation is created.
pub fn ensure_not_in_past(range: &DateRange, today: NaiveDate) -> Result<()> {
    if range.from < today {
        return Err(BookingError::StartsInPast { from: range.from, today });
    }
    Ok(())
}

/// Reject any overlap with the given confirmed ranges on the same room.
pub fn ensure_available(range: &DateRange, confirmed: &[DateRange]) -> Result<()> {
    if confirmed.iter().any(|other| range.overlaps(other)) {
        return Err(BookingError::RoomUnavailable);
    }
    Ok(())
}

/// Full validation for a new reservation.
pub fn validate_new_reservation(from: NaiveDate, to: NaiveDate, today: NaiveDate, confirmed: &[DateRange]) -> Result<DateRange> {
    let range = DateRange::new(from, to)?;
    ensure_not_in_past(&range, today)?;
    ensure_available(&range, confirmed)?;
    Ok(range)
}

/// Validation for new dates on an existing reservation. The past-date rule does not apply.
pub fn validate_rescheduled_reservation(from: NaiveDate, to: NaiveDate, confirmed: &[DateRange]) -> Result<DateRange> {
    let range = DateRange::new(from, to)?;
    ensure_available(&range, confirmed)?;
    Ok(range)
}

pub fn validate_training(training: &str) -> Result<()> {
    if training.chars().count() > MAX_TRAINING_LEN {
        return Err(BookingError::TrainingTooLong { max: MAX_TRAINING_LEN });
    }
    Ok(())
}

/// Trim and check a room name, returning the name to store.
pub fn normalize_room_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookingError::EmptyRoomName);
    }
    if name.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(BookingError::RoomNameTooLong { max: MAX_ROOM_NAME_LEN });
    }
    Ok(name.to_string())
}
