//! Authentication and authorization.
//!
//! # Authentication Methods
//!
//! Two methods, each switched on or off in [`crate::config::AuthConfig`]:
//!
//! ## 1. Native sessions
//!
//! - Users register and log in via `/authentication/register` and `/authentication/login`
//! - A signed JWT is returned in an HTTP-only cookie (see [`session`])
//! - Passwords are hashed with Argon2id (see [`password`])
//!
//! ## 2. Trusted proxy header
//!
//! - An upstream proxy authenticates the user and forwards their email in a header
//!   (`x-roomctl-user` by default)
//! - Unknown users are created on first sight when `auto_create_users` is set
//!
//! # Authorization
//!
//! - **Roles** grant `(Resource, Operation)` pairs (see [`permissions`])
//! - **Ownership** of a reservation or management of a room is checked per record, by the handlers
//!   and by [`crate::booking::transitions`]
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use roomctl::api::models::users::CurrentUser;
//!
//! async fn whoami(current_user: CurrentUser) -> String {
//!     current_user.username
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
