//! Common type definitions and permission system types.
//!
//! This module defines:
//! - Type aliases for entity IDs (UserId, RoomId, ReservationId)
//! - Permission and authorization types
//! - Resource and operation enums for access control
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`RoomId`]: Meeting room identifier
//! - [`ReservationId`]: Reservation identifier
//!
//! # Permission System
//!
//! The permission system is based on three core types:
//!
//! - [`Resource`]: What entity type is being accessed (Users, Rooms, Reservations)
//! - [`Operation`]: What action is being performed (Read, Create, Update, Delete)
//! - [`Permission`]: Authorization requirement combining resource and operation
//!
//! Role-based permissions only say what a user may do in general. Whether a user may act on one
//! specific reservation (only the room manager confirms, only the owner cancels or finishes) is
//! decided by [`crate::booking`], which reports [`Permission::RoomManager`] or
//! [`Permission::ReservationOwner`] as the missing requirement.
//!
//! ## Operations
//!
//! Operations come in two flavors:
//! - **All**: Unrestricted access to all entities (e.g., `ReadAll`, `DeleteAll`)
//! - **Own**: Restricted to user's own entities (e.g., `ReadOwn`, `UpdateOwn`)
//!
//! ## Example Permission Check
//!
//! ```ignore
//! use roomctl::types::{Permission, Resource, Operation};
//!
//! let required = Permission::Allow(Resource::Rooms, Operation::UpdateAll);
//! // Check if user has this permission...
//! ```

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type RoomId = Uuid;
pub type ReservationId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

// Operations that can be performed on resources
// *-All means unrestricted access, *-Own means restricted to own resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    CreateOwn,
    ReadAll,
    ReadOwn,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
    DeleteOwn,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Rooms,
    Reservations,
}

// Permission types for authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Simple permission: (Resource, Operation)
    Allow(Resource, Operation),
    /// User must be the manager of the room the entity belongs to
    RoomManager,
    /// User must be the owner of the reservation
    ReservationOwner,
    /// Logical combinators
    Any(Vec<Permission>),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll | Operation::CreateOwn => write!(f, "Create"),
            Operation::ReadAll | Operation::ReadOwn => write!(f, "Read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "Update"),
            Operation::DeleteAll | Operation::DeleteOwn => write!(f, "Delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Users => write!(f, "users"),
            Resource::Rooms => write!(f, "rooms"),
            Resource::Reservations => write!(f, "reservations"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_operation_display_collapses_scope() {
        assert_eq!(Operation::UpdateAll.to_string(), "Update");
        assert_eq!(Operation::UpdateOwn.to_string(), "Update");
        assert_eq!(Operation::DeleteOwn.to_string(), "Delete");
    }
}
