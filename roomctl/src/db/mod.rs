//! Database layer for data persistence and access.
//!
//! PostgreSQL through `sqlx`, organized as repositories over plain record structs:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (api::handlers - own the transaction)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database record structures
//! - [`errors`]: [`errors::DbError`] and the mapping from `sqlx::Error`
//!
//! # Transactions
//!
//! Anything that reads-then-writes runs in one transaction. Reservation writes lock the room row
//! first (see [`handlers::Rooms::lock`]) so overlap checks on a room cannot interleave:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let room = Rooms::new(&mut tx).lock(room_id).await?;
//! // ... check and write reservations ...
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in `migrations/` and are embedded with [`crate::migrator`]; they run on
//! startup.

pub mod errors;
pub mod handlers;
pub mod models;
