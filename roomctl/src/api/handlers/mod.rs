//! HTTP request handlers for all API endpoints.
//!
//! Each handler deserializes its request, resolves the caller through the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) or
//! [`RequiresPermission`](crate::auth::permissions::RequiresPermission) extractors, runs its
//! reads and writes through the repositories in [`crate::db::handlers`], and serializes the
//! response.
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout and password change
//! - [`users`]: User listing, profile and role management
//! - [`rooms`]: Room CRUD, owned by the room manager
//! - [`reservations`]: Reservations on a room and the confirm/cancel/finish actions
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching HTTP status and a
//! `{"message": ...}` JSON body.

pub mod auth;
pub mod reservations;
pub mod rooms;
pub mod users;
