//! Database models for reservations.

use crate::booking::{DateRange, ReservationSnapshot, ReservationStatus};
use crate::types::{ReservationId, RoomId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for creating a reservation. Status starts as pending.
#[derive(Debug, Clone)]
pub struct ReservationCreateDBRequest {
    pub room_id: RoomId,
    pub owner_id: UserId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub training: String,
    pub comment: Option<String>,
    pub room_password: String,
}

/// New values for the owner-editable fields. Every field is written.
#[derive(Debug, Clone)]
pub struct ReservationDetailsDBUpdate {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub training: String,
    pub comment: Option<String>,
}

/// Database response for a reservation, with the owner's username joined in
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub owner_id: UserId,
    pub owner_username: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub training: String,
    pub comment: Option<String>,
    pub rating: Option<i16>,
    pub room_password: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationDBResponse {
    /// The stored dates. The table's check constraint keeps them ordered.
    pub fn dates(&self) -> DateRange {
        DateRange {
            from: self.date_from,
            to: self.date_to,
        }
    }

    /// What the lifecycle rules need, given the manager of the reservation's room
    pub fn snapshot(&self, room_manager_id: UserId) -> ReservationSnapshot {
        ReservationSnapshot {
            id: self.id,
            owner_id: self.owner_id,
            room_manager_id,
            status: self.status,
            dates: self.dates(),
            rating: self.rating,
        }
    }
}
