//! API request/response models for rooms.

use super::pagination::Pagination;
use crate::db::models::rooms::RoomDBResponse;
use crate::types::{RoomId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing rooms
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListRoomsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only rooms managed by this user
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub room_manager: Option<UserId>,
}

/// Request body for creating a room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomCreate {
    /// Unique room name, 1-255 characters after trimming
    #[schema(example = "Blue Room")]
    pub name: String,
    /// Manager of the new room. Defaults to the caller; naming someone else needs platform
    /// manager rights.
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_manager: Option<UserId>,
}

/// Request body for updating a room. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RoomUpdate {
    #[schema(example = "Green Room")]
    pub name: Option<String>,
    /// Hand the room over to another manager
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_manager: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomId,
    pub name: String,
    #[schema(value_type = String, format = "uuid")]
    pub room_manager: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomDBResponse> for RoomResponse {
    fn from(db: RoomDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            room_manager: db.room_manager,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
