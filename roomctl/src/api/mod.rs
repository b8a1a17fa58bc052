//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Registration, login, logout, password change
//! - **Users** (`/api/v1/users/*`): Current user, user management
//! - **Rooms** (`/api/v1/rooms/*`): Rooms and their room manager
//! - **Reservations** (`/api/v1/rooms/{room_id}/reservations/*`): Booking and lifecycle actions
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod extract;
pub mod handlers;
pub mod models;
