//! API request and response data models.
//!
//! These structures define the public JSON contract and are kept apart from the database records
//! in [`crate::db::models`], so storage can change without breaking clients. Every model is
//! annotated with `utoipa` for the generated API docs.
//!
//! # Model Categories
//!
//! - [`rooms`]: Room creation, updates and listings
//! - [`reservations`]: Reservation payloads, lifecycle actions and the password-aware response
//! - [`users`]: User profiles, roles and the authenticated [`users::CurrentUser`]
//! - [`auth`]: Login, registration and session cookie responses
//! - [`pagination`]: `skip`/`limit` parameters and the paginated envelope

pub mod auth;
pub mod pagination;
pub mod reservations;
pub mod rooms;
pub mod users;
