use crate::api::extract::JsonBody;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::users::{CurrentUser, ListUsersQuery, UserResponse, UserUpdate};
use crate::auth::permissions::{RequiresPermission, can_read_all_resources, has_permission, operation, resource};
use crate::db::handlers::{Repository, Users, users::UserFilter};
use crate::db::models::users::UserUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{Operation, Permission, Resource, UserId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn user_not_found(user_id: UserId) -> Error {
    Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = PaginatedResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    _: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<UserResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let users = repo.list(&UserFilter::new(skip, limit)).await?;
    let total_count = repo.count().await?;

    Ok(Json(PaginatedResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/users/current",
    tag = "users",
    summary = "Get current user",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_current_user(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    // A session may outlive its user
    let user = repo.get_by_id(current_user.id).await?.ok_or(Error::Unauthenticated { message: None })?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Get user",
    params(
        ("user_id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - can only view yourself unless admin"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    // Can't use RequiresPermission here because we need conditional logic for own vs other users
    current_user: CurrentUser,
) -> Result<Json<UserResponse>> {
    if user_id != current_user.id && !can_read_all_resources(&current_user, Resource::Users) {
        return Err(Error::InsufficientPermissions {
            required: Permission::Allow(Resource::Users, Operation::ReadAll),
            action: Operation::ReadAll,
            resource: format!("user {user_id}"),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo.get_by_id(user_id).await?.ok_or_else(|| user_not_found(user_id))?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Update user",
    description = "Users may change their own display name. Changing roles or other users needs admin rights.",
    request_body = UserUpdate,
    params(
        ("user_id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: CurrentUser,
    JsonBody(update): JsonBody<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let can_update_all = has_permission(&current_user, Resource::Users, Operation::UpdateAll);
    let is_self = user_id == current_user.id;

    if !is_self && !can_update_all {
        return Err(Error::InsufficientPermissions {
            required: Permission::Allow(Resource::Users, Operation::UpdateAll),
            action: Operation::UpdateAll,
            resource: format!("user {user_id}"),
        });
    }
    if update.roles.is_some() && !can_update_all {
        return Err(Error::InsufficientPermissions {
            required: Permission::Allow(Resource::Users, Operation::UpdateAll),
            action: Operation::UpdateAll,
            resource: "user roles".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let user;
    {
        let mut repo = Users::new(&mut tx);
        if repo.get_by_id(user_id).await?.is_none() {
            return Err(user_not_found(user_id));
        }
        user = repo.update(user_id, &UserUpdateDBRequest::new(update)).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Delete user",
    description = "Deletes the user together with the rooms they manage and the reservations they own.",
    params(
        ("user_id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: RequiresPermission<resource::Users, operation::DeleteAll>,
) -> Result<StatusCode> {
    if user_id == current_user.id {
        return Err(Error::BadRequest {
            message: "Cannot delete your own account".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    if repo.delete(user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(user_not_found(user_id))
    }
}
