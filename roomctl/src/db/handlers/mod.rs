//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` (a pooled connection or, for anything that
//! writes, a transaction), binds parameters for runtime-checked `sqlx` queries, and returns the
//! records from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: user accounts and roles
//! - [`Rooms`]: rooms, including the per-room row lock used by reservation writes
//! - [`Reservations`]: reservations, overlap lookups and lifecycle writes
//!
//! # Common Pattern
//!
//! ```ignore
//! use roomctl::db::handlers::{Repository, Rooms};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Rooms::new(&mut tx);
//!     let rooms = repo.list(&RoomFilter::new(0, 10)).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod repository;
pub mod reservations;
pub mod rooms;
pub mod users;

pub use repository::Repository;
pub use reservations::Reservations;
pub use rooms::Rooms;
pub use users::Users;
