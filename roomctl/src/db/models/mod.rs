//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept separate from the API
//! models in [`crate::api::models`] so the storage and wire representations can change
//! independently; conversions live on the API side (`From<RoomDBResponse> for RoomResponse` and
//! so on).
//!
//! - [`users`]: user accounts and their roles
//! - [`rooms`]: meeting rooms
//! - [`reservations`]: room reservations, plus the conversion to a
//!   [`crate::booking::ReservationSnapshot`]

pub mod reservations;
pub mod rooms;
pub mod users;
