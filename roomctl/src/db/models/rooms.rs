//! Database models for rooms.

use crate::types::{RoomId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new room
#[derive(Debug, Clone)]
pub struct RoomCreateDBRequest {
    /// Already trimmed and length-checked
    pub name: String,
    pub room_manager: UserId,
}

/// Database request for updating a room
#[derive(Debug, Clone, Default)]
pub struct RoomUpdateDBRequest {
    pub name: Option<String>,
    pub room_manager: Option<UserId>,
}

/// Database response for a room
#[derive(Debug, Clone, FromRow)]
pub struct RoomDBResponse {
    pub id: RoomId,
    pub name: String,
    pub room_manager: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
