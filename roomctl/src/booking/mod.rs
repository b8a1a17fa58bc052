//! Reservation lifecycle: date validation, overlap detection, status transitions and ratings.
//!
//! Everything here is pure. Handlers load a [`ReservationSnapshot`] and the confirmed date ranges
//! that could conflict inside their transaction, ask this module for the next state, and persist
//! the answer. That keeps the rules testable without a database.
//!
//! # Lifecycle
//!
//! ```text
//!            confirm (room manager)
//!   pending ────────────────────────► confirmed ──── finish (owner, after date_to) ──► rated
//!      │  \                               │
//!      │   \ confirm: rejected            │ cancel (owner) / confirm: cancelled
//!      │    ▼                             ▼
//!      │   rejected                   cancelled
//!      └──── cancel (owner) ────────────► ▲
//! ```
//!
//! Rating does not change the status: a finished reservation stays `confirmed` with its rating
//! set, and the rating can only be set once.
//!
//! # Modules
//!
//! - [`validation`]: date ranges, overlap checks, label and name rules
//! - [`transitions`]: who may move a reservation where

mod error;
pub mod transitions;
pub mod validation;

use std::fmt;

use chrono::NaiveDate;
use rand::prelude::RngExt;
use rand::rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::{BookingError, Result};
pub use transitions::ReservationSnapshot;

/// Length of the generated room access password.
pub const DEFAULT_PASSWORD_LENGTH: usize = 10;

const PASSWORD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Status of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Waiting to be confirmed by the room manager
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Rejected => "rejected",
        }
    }

    /// No transition leaves these states
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Rejected)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-event rating, 1 to 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Rating(i16);

impl Rating {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = BookingError;

    fn try_from(value: i16) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BookingError::InvalidRating { value })
        }
    }
}

/// Inclusive range of calendar days a reservation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `from > to`. A single-day booking has `from == to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(BookingError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Both ends are inclusive, so ranges sharing a single day overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }

    /// The last booked day is strictly before `today`
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.to < today
    }
}

/// Generate a random alphanumeric access password of the given length.
pub fn generate_room_password(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_reversed_dates() {
        let err = DateRange::new(day(10), day(9)).unwrap_err();
        assert_eq!(err, BookingError::InvalidDateRange { from: day(10), to: day(9) });
        assert_eq!(err.to_string(), "finish must occur after start");
    }

    #[test]
    fn test_single_day_range_is_valid() {
        let range = DateRange::new(day(10), day(10)).unwrap();
        assert_eq!(range.from, range.to);
    }

    #[test]
    fn test_overlap_is_inclusive_and_symmetric() {
        let a = DateRange::new(day(1), day(5)).unwrap();
        let touching = DateRange::new(day(5), day(8)).unwrap();
        let inside = DateRange::new(day(2), day(3)).unwrap();
        let after = DateRange::new(day(6), day(9)).unwrap();

        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
        assert!(!a.overlaps(&after));
        assert!(!after.overlaps(&a));
    }

    #[test]
    fn test_has_ended() {
        let range = DateRange::new(day(1), day(5)).unwrap();
        assert!(!range.has_ended(day(5)));
        assert!(range.has_ended(day(6)));
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::try_from(1).unwrap().value(), 1);
        assert_eq!(Rating::try_from(5).unwrap().value(), 5);
        assert_eq!(Rating::try_from(0), Err(BookingError::InvalidRating { value: 0 }));
        assert_eq!(Rating::try_from(6), Err(BookingError::InvalidRating { value: 6 }));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ReservationStatus::Confirmed).unwrap(), "\"confirmed\"");
        let status: ReservationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, ReservationStatus::Rejected);
        assert!(serde_json::from_str::<ReservationStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_generated_passwords() {
        let password = generate_room_password(DEFAULT_PASSWORD_LENGTH);
        assert_eq!(password.len(), DEFAULT_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));

        let passwords: HashSet<String> = (0..50).map(|_| generate_room_password(DEFAULT_PASSWORD_LENGTH)).collect();
        assert!(passwords.len() > 45, "passwords should be random");
    }
}
