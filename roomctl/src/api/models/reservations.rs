//! API request/response models for reservations.

use super::pagination::Pagination;
use crate::booking::{ReservationStatus, transitions::password_visible_to};
use crate::db::models::reservations::ReservationDBResponse;
use crate::types::{ReservationId, RoomId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing a room's reservations
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListReservationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only reservations in this status
    pub status: Option<ReservationStatus>,
}

/// Request body for creating a reservation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationCreate {
    /// First booked day (inclusive), not in the past
    #[schema(value_type = String, format = "date", example = "2025-06-02")]
    pub date_from: NaiveDate,
    /// Last booked day (inclusive)
    #[schema(value_type = String, format = "date", example = "2025-06-04")]
    pub date_to: NaiveDate,
    /// Training label, at most 156 characters. Defaults to the configured label.
    #[schema(example = "Onboarding")]
    pub training: Option<String>,
    pub comment: Option<String>,
}

/// Owner edit of a pending reservation. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReservationUpdate {
    #[schema(value_type = Option<String>, format = "date")]
    pub date_from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_to: Option<NaiveDate>,
    pub training: Option<String>,
    /// `null` clears the comment
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub comment: Option<Option<String>>,
}

/// Room manager's decision on a reservation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    /// `confirmed`, `cancelled` or `rejected`
    pub status: ReservationStatus,
}

/// Owner's post-event rating
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinishRequest {
    /// 1 to 5
    #[schema(minimum = 1, maximum = 5, example = 4)]
    pub rating: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReservationId,
    #[schema(value_type = String, format = "uuid")]
    pub room_id: RoomId,
    #[schema(value_type = String, format = "uuid")]
    pub owner_id: UserId,
    pub owner_username: String,
    #[schema(value_type = String, format = "date")]
    pub date_from: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub date_to: NaiveDate,
    pub training: String,
    pub comment: Option<String>,
    pub status: ReservationStatus,
    pub rating: Option<i16>,
    /// Room access password, only shown to the owner once the reservation is confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationResponse {
    /// Render a reservation for `viewer`, hiding the password unless they may see it
    pub fn for_viewer(db: ReservationDBResponse, viewer: UserId) -> Self {
        let room_password = password_visible_to(db.owner_id, db.status, viewer).then_some(db.room_password);

        Self {
            id: db.id,
            room_id: db.room_id,
            owner_id: db.owner_id,
            owner_username: db.owner_username,
            date_from: db.date_from,
            date_to: db.date_to,
            training: db.training,
            comment: db.comment,
            status: db.status,
            rating: db.rating,
            room_password,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Result of a confirm, cancel or finish action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationActionResponse {
    pub message: String,
    pub reservation: ReservationResponse,
}
