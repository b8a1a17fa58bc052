//! Role-based permission checks.
//!
//! Roles grant `(Resource, Operation)` pairs. `*All` operations apply to every record, `*Own`
//! operations only to records the caller owns; handlers check ownership themselves.
//!
//! Handlers declare their baseline requirement in the signature:
//!
//! ```ignore
//! async fn create_room(
//!     State(state): State<AppState>,
//!     current_user: RequiresPermission<resource::Rooms, operation::CreateOwn>,
//!     JsonBody(create): JsonBody<RoomCreate>,
//! ) -> Result<...> {
//!     let manager = create.room_manager.unwrap_or(current_user.id);
//!     // widen with has_permission(&current_user, Resource::Rooms, Operation::CreateAll)
//! }
//! ```

use std::{marker::PhantomData, ops::Deref};

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::instrument;

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::{Operation, Permission, Resource},
};

/// Operations a role grants on a resource.
fn role_permissions(role: Role, resource: Resource) -> &'static [Operation] {
    use Operation::*;

    match (role, resource) {
        (Role::PlatformManager, _) => &[CreateAll, CreateOwn, ReadAll, ReadOwn, UpdateAll, UpdateOwn, DeleteAll, DeleteOwn],
        (Role::StandardUser, Resource::Rooms) => &[ReadAll, ReadOwn, CreateOwn, UpdateOwn, DeleteOwn],
        // Reservations are never deleted, only cancelled
        (Role::StandardUser, Resource::Reservations) => &[ReadAll, ReadOwn, CreateOwn, UpdateOwn],
        (Role::StandardUser, Resource::Users) => &[ReadOwn, UpdateOwn],
    }
}

/// Whether any of the user's roles grants `operation` on `resource`. Admins hold everything.
pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    user.is_admin
        || user
            .roles
            .iter()
            .any(|role| role_permissions(*role, resource).contains(&operation))
}

/// Shorthand for the common "may this user see everyone's records" check
pub fn can_read_all_resources(user: &CurrentUser, resource: Resource) -> bool {
    has_permission(user, resource, Operation::ReadAll)
}

pub fn require_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> Result<()> {
    if has_permission(user, resource, operation) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: Permission::Allow(resource, operation),
            action: operation,
            resource: resource.to_string(),
        })
    }
}

/// Passes for the record's owner, or for anyone holding `all_operation` on the resource.
pub fn require_owner_or(user: &CurrentUser, owner: crate::types::UserId, resource: Resource, all_operation: Operation) -> Result<()> {
    if user.id == owner {
        return Ok(());
    }
    require_permission(user, resource, all_operation)
}

/// Type-level resource markers for [`RequiresPermission`]
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceType {
        const RESOURCE: Resource;
    }

    pub struct Users;
    pub struct Rooms;
    pub struct Reservations;

    impl ResourceType for Users {
        const RESOURCE: Resource = Resource::Users;
    }
    impl ResourceType for Rooms {
        const RESOURCE: Resource = Resource::Rooms;
    }
    impl ResourceType for Reservations {
        const RESOURCE: Resource = Resource::Reservations;
    }
}

/// Type-level operation markers for [`RequiresPermission`]
pub mod operation {
    use crate::types::Operation;

    pub trait OperationType {
        const OPERATION: Operation;
    }

    macro_rules! operations {
        ($($name:ident),* $(,)?) => {
            $(
                pub struct $name;
                impl OperationType for $name {
                    const OPERATION: Operation = Operation::$name;
                }
            )*
        };
    }

    operations!(CreateAll, CreateOwn, ReadAll, ReadOwn, UpdateAll, UpdateOwn, DeleteAll, DeleteOwn);
}

/// Extractor that authenticates the caller and requires a role permission.
///
/// Derefs to the [`CurrentUser`].
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceType,
    O: operation::OperationType,
{
    type Rejection = Error;

    #[instrument(skip_all, fields(resource = %R::RESOURCE, operation = ?O::OPERATION))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_permission(&user, R::RESOURCE, O::OPERATION)?;
        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(roles: Vec<Role>, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "someone".to_string(),
            email: "someone@example.com".to_string(),
            is_admin,
            roles,
            display_name: None,
        }
    }

    #[test]
    fn test_standard_user_permissions() {
        let standard = user(vec![Role::StandardUser], false);

        assert!(has_permission(&standard, Resource::Rooms, Operation::ReadAll));
        assert!(has_permission(&standard, Resource::Rooms, Operation::CreateOwn));
        assert!(!has_permission(&standard, Resource::Rooms, Operation::CreateAll));
        assert!(!has_permission(&standard, Resource::Rooms, Operation::DeleteAll));

        assert!(has_permission(&standard, Resource::Reservations, Operation::CreateOwn));
        assert!(!has_permission(&standard, Resource::Reservations, Operation::DeleteOwn));

        assert!(has_permission(&standard, Resource::Users, Operation::ReadOwn));
        assert!(!has_permission(&standard, Resource::Users, Operation::ReadAll));
        assert!(!can_read_all_resources(&standard, Resource::Users));
    }

    #[test]
    fn test_platform_manager_and_admin_hold_everything() {
        let manager = user(vec![Role::StandardUser, Role::PlatformManager], false);
        let admin = user(vec![Role::StandardUser], true);

        for candidate in [&manager, &admin] {
            assert!(has_permission(candidate, Resource::Users, Operation::DeleteAll));
            assert!(has_permission(candidate, Resource::Rooms, Operation::UpdateAll));
            assert!(has_permission(candidate, Resource::Reservations, Operation::ReadAll));
        }
    }

    #[test]
    fn test_require_permission_error() {
        let standard = user(vec![Role::StandardUser], false);
        let err = require_permission(&standard, Resource::Users, Operation::ReadAll).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        match err {
            Error::InsufficientPermissions { required, .. } => {
                assert_eq!(required, Permission::Allow(Resource::Users, Operation::ReadAll));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_require_owner_or() {
        let standard = user(vec![Role::StandardUser], false);
        assert!(require_owner_or(&standard, standard.id, Resource::Rooms, Operation::UpdateAll).is_ok());
        assert!(require_owner_or(&standard, Uuid::new_v4(), Resource::Rooms, Operation::UpdateAll).is_err());

        let admin = user(vec![Role::StandardUser], true);
        assert!(require_owner_or(&admin, Uuid::new_v4(), Resource::Rooms, Operation::UpdateAll).is_ok());
    }

    #[test]
    fn test_marker_constants() {
        use operation::OperationType;
        use resource::ResourceType;

        assert_eq!(resource::Rooms::RESOURCE, Resource::Rooms);
        assert_eq!(operation::UpdateOwn::OPERATION, Operation::UpdateOwn);
    }
}
