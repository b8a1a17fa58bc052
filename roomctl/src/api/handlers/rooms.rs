use crate::api::extract::JsonBody;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::rooms::{ListRoomsQuery, RoomCreate, RoomResponse, RoomUpdate};
use crate::api::models::users::CurrentUser;
use crate::auth::permissions::{RequiresPermission, operation, require_owner_or, require_permission, resource};
use crate::booking::validation::normalize_room_name;
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Rooms, rooms::RoomFilter};
use crate::db::models::rooms::{RoomCreateDBRequest, RoomUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Operation, Resource, RoomId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

pub(crate) fn room_not_found(room_id: RoomId) -> Error {
    Error::NotFound {
        resource: "Room".to_string(),
        id: room_id.to_string(),
    }
}

fn duplicate_name() -> Error {
    Error::BadRequest {
        message: "Find another name.".to_string(),
    }
}

/// A concurrent insert can still win the race after the name pre-check
fn map_duplicate_name(err: DbError) -> Error {
    if err.is_unique_violation_of("rooms_name_unique") {
        duplicate_name()
    } else {
        Error::Database(err)
    }
}

#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    summary = "List rooms",
    description = "Rooms ordered by name",
    params(ListRoomsQuery),
    responses(
        (status = 200, description = "Page of rooms", body = PaginatedResponse<RoomResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<ListRoomsQuery>,
    _: RequiresPermission<resource::Rooms, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<RoomResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = RoomFilter::new(skip, limit);
    if let Some(room_manager) = query.room_manager {
        filter = filter.with_room_manager(room_manager);
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut pool_conn);

    let rooms = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        rooms.into_iter().map(RoomResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    summary = "Create room",
    request_body = RoomCreate,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Invalid name, duplicate name or unknown manager"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - only platform managers can create rooms for others"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_room(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Rooms, operation::CreateOwn>,
    JsonBody(create): JsonBody<RoomCreate>,
) -> Result<(StatusCode, Json<RoomResponse>)> {
    let name = normalize_room_name(&create.name)?;
    let room_manager = create.room_manager.unwrap_or(current_user.id);
    if room_manager != current_user.id {
        require_permission(&current_user, Resource::Rooms, Operation::CreateAll)?;
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let room;
    {
        let mut repo = Rooms::new(&mut tx);
        if repo.get_by_name(&name).await?.is_some() {
            return Err(duplicate_name());
        }
        room = repo
            .create(&RoomCreateDBRequest { name, room_manager })
            .await
            .map_err(map_duplicate_name)?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Get room",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room details", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    _: RequiresPermission<resource::Rooms, operation::ReadAll>,
) -> Result<Json<RoomResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut pool_conn);

    match repo.get_by_id(room_id).await? {
        Some(room) => Ok(Json(RoomResponse::from(room))),
        None => Err(room_not_found(room_id)),
    }
}

#[utoipa::path(
    patch,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Update room",
    description = "Rename the room or hand it to another manager. Allowed for the room manager and platform managers.",
    request_body = RoomUpdate,
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 400, description = "Invalid name, duplicate name or unknown manager"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id))]
pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    current_user: CurrentUser,
    JsonBody(update): JsonBody<RoomUpdate>,
) -> Result<Json<RoomResponse>> {
    let name = update.name.as_deref().map(normalize_room_name).transpose()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let room;
    {
        let mut repo = Rooms::new(&mut tx);
        let existing = repo.lock(room_id).await?.ok_or_else(|| room_not_found(room_id))?;
        require_owner_or(&current_user, existing.room_manager, Resource::Rooms, Operation::UpdateAll)?;

        if let Some(name) = &name
            && let Some(other) = repo.get_by_name(name).await?
            && other.id != room_id
        {
            return Err(duplicate_name());
        }

        let request = RoomUpdateDBRequest {
            name,
            room_manager: update.room_manager,
        };
        room = repo.update(room_id, &request).await.map_err(map_duplicate_name)?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(RoomResponse::from(room)))
}

#[utoipa::path(
    delete,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Delete room",
    description = "Deletes the room and all of its reservations",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id))]
pub async fn delete_room(State(state): State<AppState>, Path(room_id): Path<RoomId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    {
        let mut repo = Rooms::new(&mut tx);
        let existing = repo.lock(room_id).await?.ok_or_else(|| room_not_found(room_id))?;
        require_owner_or(&current_user, existing.room_manager, Resource::Rooms, Operation::DeleteAll)?;
        repo.delete(room_id).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
