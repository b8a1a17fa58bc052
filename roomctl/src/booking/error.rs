use chrono::NaiveDate;
use thiserror::Error;

use super::ReservationStatus;
use crate::types::ReservationId;

/// Result type for reservation lifecycle operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Rule violations raised by the reservation lifecycle.
///
/// Display strings are user-facing: they end up verbatim in 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// `date_from` is after `date_to`
    #[error("finish must occur after start")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    /// New reservations cannot start before today
    #[error("Reservations cannot start in the past")]
    StartsInPast { from: NaiveDate, today: NaiveDate },

    /// Another confirmed reservation overlaps the requested dates
    #[error("Room is reserved at this term")]
    RoomUnavailable,

    #[error("Training label cannot be longer than {max} characters")]
    TrainingTooLong { max: usize },

    #[error("Room name cannot be empty")]
    EmptyRoomName,

    #[error("Room name cannot be longer than {max} characters")]
    RoomNameTooLong { max: usize },

    #[error("Rating must be between 1 and 5")]
    InvalidRating { value: i16 },

    /// Confirm was attempted by someone other than the room manager
    #[error("Only the room manager can decide on reservation {reservation_id}")]
    NotRoomManager { reservation_id: ReservationId },

    /// Cancel, finish or edit was attempted by someone other than the owner
    #[error("Only the owner can {action} reservation {reservation_id}")]
    NotOwner {
        reservation_id: ReservationId,
        action: &'static str,
    },

    /// The room manager asked to move a reservation back to pending
    #[error("A reservation cannot be set to {to}")]
    InvalidDecision { to: ReservationStatus },

    #[error("Reservation cannot go from {from} to {to}")]
    InvalidTransition { from: ReservationStatus, to: ReservationStatus },

    #[error("You can add evaluation after training.")]
    TrainingNotFinished,

    #[error("You can add evaluation only once.")]
    AlreadyRated,

    #[error("Only pending reservations can be changed")]
    NotEditable { status: ReservationStatus },
}

impl BookingError {
    /// Whether the error is about who is acting rather than what they asked for
    pub fn is_permission_error(&self) -> bool {
        matches!(self, BookingError::NotRoomManager { .. } | BookingError::NotOwner { .. })
    }
}
