//! Reservations nested under a room, and their lifecycle actions.
//!
//! Every write locks the room row first and then the reservation row, loads the confirmed ranges
//! that could conflict, asks [`crate::booking`] for the outcome and persists it, all in one
//! transaction.

use crate::api::extract::JsonBody;
use crate::api::handlers::rooms::room_not_found;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::reservations::{
    ConfirmRequest, FinishRequest, ListReservationsQuery, ReservationActionResponse, ReservationCreate, ReservationResponse,
    ReservationUpdate,
};
use crate::auth::permissions::{RequiresPermission, operation, resource};
use crate::booking::{
    BookingError, DateRange, ReservationStatus, generate_room_password, transitions,
    validation::{validate_new_reservation, validate_rescheduled_reservation, validate_training},
};
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Reservations, Rooms, reservations::ReservationFilter};
use crate::db::models::reservations::{ReservationCreateDBRequest, ReservationDBResponse, ReservationDetailsDBUpdate};
use crate::db::models::rooms::RoomDBResponse;
use crate::errors::{Error, Result};
use crate::types::{ReservationId, RoomId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::PgConnection;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn reservation_not_found(reservation_id: ReservationId) -> Error {
    Error::NotFound {
        resource: "Reservation".to_string(),
        id: reservation_id.to_string(),
    }
}

/// Trim a training label, falling back to `default` when it is missing or blank
fn training_or_default(training: Option<&str>, default: &str) -> String {
    match training.map(str::trim) {
        Some(training) if !training.is_empty() => training.to_string(),
        _ => default.to_string(),
    }
}

/// Lock the room and then the reservation, 404ing if either is missing or they do not belong
/// together.
async fn lock_reservation(
    conn: &mut PgConnection,
    room_id: RoomId,
    reservation_id: ReservationId,
) -> Result<(RoomDBResponse, ReservationDBResponse)> {
    let room = Rooms::new(&mut *conn).lock(room_id).await?.ok_or_else(|| room_not_found(room_id))?;
    let reservation = Reservations::new(&mut *conn)
        .get_for_update(room_id, reservation_id)
        .await?
        .ok_or_else(|| reservation_not_found(reservation_id))?;

    Ok((room, reservation))
}

#[utoipa::path(
    get,
    path = "/rooms/{room_id}/reservations",
    tag = "reservations",
    summary = "List reservations",
    description = "Reservations of one room, ordered by start date",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ListReservationsQuery
    ),
    responses(
        (status = 200, description = "Page of reservations", body = PaginatedResponse<ReservationResponse>),
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
pub async fn list_reservations(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Query(query): Query<ListReservationsQuery>,
    current_user: RequiresPermission<resource::Reservations, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<ReservationResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Rooms::new(&mut pool_conn).get_by_id(room_id).await?.is_none() {
        return Err(room_not_found(room_id));
    }

    let filter = ReservationFilter::new(room_id, skip, limit).with_status(query.status);
    let mut repo = Reservations::new(&mut pool_conn);
    let reservations = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        reservations
            .into_iter()
            .map(|r| ReservationResponse::for_viewer(r, current_user.id))
            .collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/rooms/{room_id}/reservations",
    tag = "reservations",
    summary = "Create reservation",
    description = "Book the room for the caller. The reservation starts as pending.",
    request_body = ReservationCreate,
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Invalid dates, start in the past, or room already reserved"),
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
pub async fn create_reservation(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    current_user: RequiresPermission<resource::Reservations, operation::CreateOwn>,
    JsonBody(create): JsonBody<ReservationCreate>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    let training = training_or_default(create.training.as_deref(), &state.config.reservations.default_training);
    validate_training(&training)?;
    let window = DateRange::new(create.date_from, create.date_to)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    Rooms::new(&mut tx).lock(room_id).await?.ok_or_else(|| room_not_found(room_id))?;

    let reservation = {
        let mut repo = Reservations::new(&mut tx);
        let confirmed = repo.confirmed_in_window(room_id, window, None).await?;
        let dates = validate_new_reservation(create.date_from, create.date_to, today(), &confirmed)?;

        repo.create(&ReservationCreateDBRequest {
            room_id,
            owner_id: current_user.id,
            date_from: dates.from,
            date_to: dates.to,
            training,
            comment: create.comment,
            room_password: generate_room_password(state.config.reservations.password_length),
        })
        .await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(reservation_id = %reservation.id, "Reservation created");
    Ok((StatusCode::CREATED, Json(ReservationResponse::for_viewer(reservation, current_user.id))))
}

#[utoipa::path(
    get,
    path = "/rooms/{room_id}/reservations/{reservation_id}",
    tag = "reservations",
    summary = "Get reservation",
    description = "The room password is included only for the owner of a confirmed reservation",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation details", body = ReservationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room or reservation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id, reservation_id = %reservation_id))]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path((room_id, reservation_id)): Path<(RoomId, ReservationId)>,
    current_user: RequiresPermission<resource::Reservations, operation::ReadAll>,
) -> Result<Json<ReservationResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    let reservation = repo
        .get_by_id(reservation_id)
        .await?
        .filter(|r| r.room_id == room_id)
        .ok_or_else(|| reservation_not_found(reservation_id))?;

    Ok(Json(ReservationResponse::for_viewer(reservation, current_user.id)))
}

#[utoipa::path(
    patch,
    path = "/rooms/{room_id}/reservations/{reservation_id}",
    tag = "reservations",
    summary = "Update reservation",
    description = "The owner may change dates, training and comment while the reservation is pending",
    request_body = ReservationUpdate,
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation updated", body = ReservationResponse),
        (status = 400, description = "Invalid dates, room already reserved, or not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - only the owner can edit"),
        (status = 404, description = "Room or reservation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id, reservation_id = %reservation_id))]
pub async fn update_reservation(
    State(state): State<AppState>,
    Path((room_id, reservation_id)): Path<(RoomId, ReservationId)>,
    current_user: RequiresPermission<resource::Reservations, operation::UpdateOwn>,
    JsonBody(update): JsonBody<ReservationUpdate>,
) -> Result<Json<ReservationResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let (room, existing) = lock_reservation(&mut tx, room_id, reservation_id).await?;
    transitions::ensure_editable(&existing.snapshot(room.room_manager), current_user.id)?;

    let training = match update.training.as_deref() {
        Some(training) => training_or_default(Some(training), &state.config.reservations.default_training),
        None => existing.training.clone(),
    };
    validate_training(&training)?;

    let date_from = update.date_from.unwrap_or(existing.date_from);
    let date_to = update.date_to.unwrap_or(existing.date_to);
    let window = DateRange::new(date_from, date_to)?;

    let reservation = {
        let mut repo = Reservations::new(&mut tx);
        let confirmed = repo.confirmed_in_window(room_id, window, Some(reservation_id)).await?;
        let dates = validate_rescheduled_reservation(date_from, date_to, &confirmed)?;

        repo.update_details(
            reservation_id,
            &ReservationDetailsDBUpdate {
                date_from: dates.from,
                date_to: dates.to,
                training,
                comment: match update.comment {
                    Some(comment) => comment,
                    None => existing.comment,
                },
            },
        )
        .await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationResponse::for_viewer(reservation, current_user.id)))
}

#[utoipa::path(
    delete,
    path = "/rooms/{room_id}/reservations/{reservation_id}",
    tag = "reservations",
    summary = "Delete reservation (not supported)",
    description = "Reservations are never deleted; cancel them instead",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 403, description = "Always"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_reservation(Path((_room_id, _reservation_id)): Path<(RoomId, ReservationId)>) -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "message": "Delete function is not offered in this path." })),
    )
}

#[utoipa::path(
    post,
    path = "/rooms/{room_id}/reservations/{reservation_id}/confirm",
    tag = "reservations",
    summary = "Decide on a reservation",
    description = "The room manager confirms, rejects or cancels a pending reservation, or cancels a confirmed one",
    request_body = ConfirmRequest,
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Status is changed", body = ReservationActionResponse),
        (status = 400, description = "Transition not allowed or room already reserved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - only the room manager can decide"),
        (status = 404, description = "Room or reservation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id, reservation_id = %reservation_id, decision = %request.status))]
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path((room_id, reservation_id)): Path<(RoomId, ReservationId)>,
    current_user: RequiresPermission<resource::Reservations, operation::UpdateOwn>,
    JsonBody(request): JsonBody<ConfirmRequest>,
) -> Result<Json<ReservationActionResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let (room, existing) = lock_reservation(&mut tx, room_id, reservation_id).await?;

    let reservation = {
        let mut repo = Reservations::new(&mut tx);
        let confirmed = if request.status == ReservationStatus::Confirmed {
            repo.confirmed_in_window(room_id, existing.dates(), Some(reservation_id)).await?
        } else {
            Vec::new()
        };
        let next = transitions::confirm(&existing.snapshot(room.room_manager), current_user.id, request.status, &confirmed)?;

        repo.set_status(reservation_id, next).await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(status = %reservation.status, "Reservation status changed by room manager");
    Ok(Json(ReservationActionResponse {
        message: "Status is changed".to_string(),
        reservation: ReservationResponse::for_viewer(reservation, current_user.id),
    }))
}

#[utoipa::path(
    post,
    path = "/rooms/{room_id}/reservations/{reservation_id}/cancel",
    tag = "reservations",
    summary = "Cancel reservation",
    description = "The owner cancels a pending or confirmed reservation",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation is canceled", body = ReservationActionResponse),
        (status = 400, description = "Reservation already cancelled or rejected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - only the owner can cancel"),
        (status = 404, description = "Room or reservation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id, reservation_id = %reservation_id))]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path((room_id, reservation_id)): Path<(RoomId, ReservationId)>,
    current_user: RequiresPermission<resource::Reservations, operation::UpdateOwn>,
) -> Result<Json<ReservationActionResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let (room, existing) = lock_reservation(&mut tx, room_id, reservation_id).await?;
    let next = transitions::cancel(&existing.snapshot(room.room_manager), current_user.id)?;
    let reservation = Reservations::new(&mut tx).set_status(reservation_id, next).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationActionResponse {
        message: "Reservation is canceled".to_string(),
        reservation: ReservationResponse::for_viewer(reservation, current_user.id),
    }))
}

#[utoipa::path(
    post,
    path = "/rooms/{room_id}/reservations/{reservation_id}/finish",
    tag = "reservations",
    summary = "Rate a finished training",
    description = "The owner rates a confirmed reservation once its last day has passed. A rating can be given only once.",
    request_body = FinishRequest,
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID"),
        ("reservation_id" = uuid::Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "The training has been assessed", body = ReservationActionResponse),
        (status = 400, description = "Training not finished, already rated, or rating out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - only the owner can rate"),
        (status = 404, description = "Room or reservation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(room_id = %room_id, reservation_id = %reservation_id))]
pub async fn finish_reservation(
    State(state): State<AppState>,
    Path((room_id, reservation_id)): Path<(RoomId, ReservationId)>,
    current_user: RequiresPermission<resource::Reservations, operation::UpdateOwn>,
    JsonBody(request): JsonBody<FinishRequest>,
) -> Result<Json<ReservationActionResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let (room, existing) = lock_reservation(&mut tx, room_id, reservation_id).await?;
    let rating = transitions::finish(&existing.snapshot(room.room_manager), current_user.id, request.rating, today())?;

    let reservation = match Reservations::new(&mut tx).set_rating(reservation_id, rating).await {
        Ok(reservation) => reservation,
        // The write-once guard in the update matched nothing
        Err(DbError::NotFound) => return Err(BookingError::AlreadyRated.into()),
        Err(e) => return Err(e.into()),
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationActionResponse {
        message: "The training has been assessed".to_string(),
        reservation: ReservationResponse::for_viewer(reservation, current_user.id),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::pagination::PaginatedResponse;
    use crate::api::models::reservations::{ReservationActionResponse, ReservationResponse};
    use crate::api::models::users::{Role, UserResponse};
    use crate::booking::ReservationStatus;
    use crate::db::handlers::Reservations;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_reservation, create_test_room, create_test_user};
    use axum::http::StatusCode;
    use axum_test::{TestResponse, TestServer};
    use chrono::{Days, NaiveDate, Utc};
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn days_from_today(days: i64) -> NaiveDate {
        let today = Utc::now().date_naive();
        if days >= 0 {
            today.checked_add_days(Days::new(days as u64)).unwrap()
        } else {
            today.checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
        }
    }

    async fn post_as(app: &TestServer, user: &UserResponse, path: &str, body: Value) -> TestResponse {
        let auth = add_auth_headers(user);
        app.post(path).add_header(auth[0].0.clone(), auth[0].1.clone()).json(&body).await
    }

    async fn get_as(app: &TestServer, user: &UserResponse, path: &str) -> TestResponse {
        let auth = add_auth_headers(user);
        app.get(path).add_header(auth[0].0.clone(), auth[0].1.clone()).await
    }

    async fn set_status(pool: &PgPool, id: Uuid, status: ReservationStatus) {
        let mut conn = pool.acquire().await.unwrap();
        Reservations::new(&mut conn).set_status(id, status).await.unwrap();
    }

    fn message(response: &TestResponse) -> String {
        response.json::<Value>()["message"].as_str().unwrap().to_string()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_reservation(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;

        let response = post_as(
            &app,
            &owner,
            &format!("/api/v1/rooms/{}/reservations", room.id),
            json!({"date_from": days_from_today(1), "date_to": days_from_today(2), "comment": "bring snacks"}),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        let reservation: ReservationResponse = response.json();
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.training, "Test");
        assert_eq!(reservation.owner_id, owner.id);
        assert_eq!(reservation.owner_username, owner.username);
        assert_eq!(reservation.comment.as_deref(), Some("bring snacks"));
        assert!(reservation.room_password.is_none());
        assert!(reservation.rating.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_reservation_validation(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let path = format!("/api/v1/rooms/{}/reservations", room.id);

        let response = post_as(&app, &manager, &path, json!({"date_from": days_from_today(3), "date_to": days_from_today(2)})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "finish must occur after start");

        let response = post_as(&app, &manager, &path, json!({"date_from": days_from_today(-1), "date_to": days_from_today(2)})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Reservations cannot start in the past");

        let response = post_as(
            &app,
            &manager,
            &path,
            json!({"date_from": days_from_today(1), "date_to": days_from_today(1), "training": "t".repeat(157)}),
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Today is not in the past, and single-day bookings are fine
        post_as(&app, &manager, &path, json!({"date_from": days_from_today(0), "date_to": days_from_today(0)}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = post_as(
            &app,
            &manager,
            &format!("/api/v1/rooms/{}/reservations", Uuid::new_v4()),
            json!({"date_from": days_from_today(1), "date_to": days_from_today(1)}),
        )
        .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_overlap_with_confirmed_rejected(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let booked = create_test_reservation(&pool, room.id, owner.id, days_from_today(5), days_from_today(7)).await;
        set_status(&pool, booked.id, ReservationStatus::Confirmed).await;
        let path = format!("/api/v1/rooms/{}/reservations", room.id);

        // Sharing the last day counts as overlap
        let response = post_as(&app, &owner, &path, json!({"date_from": days_from_today(7), "date_to": days_from_today(9)})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Room is reserved at this term");

        post_as(&app, &owner, &path, json!({"date_from": days_from_today(8), "date_to": days_from_today(9)}))
            .await
            .assert_status(StatusCode::CREATED);
        // Pending reservations do not block each other
        post_as(&app, &owner, &path, json!({"date_from": days_from_today(8), "date_to": days_from_today(9)}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_reservations(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let other_room = create_test_room(&pool, manager.id, "Red").await;
        let later = create_test_reservation(&pool, room.id, owner.id, days_from_today(10), days_from_today(11)).await;
        let earlier = create_test_reservation(&pool, room.id, owner.id, days_from_today(2), days_from_today(3)).await;
        create_test_reservation(&pool, other_room.id, owner.id, days_from_today(2), days_from_today(3)).await;
        set_status(&pool, later.id, ReservationStatus::Confirmed).await;

        let response = get_as(&app, &manager, &format!("/api/v1/rooms/{}/reservations", room.id)).await;
        response.assert_status_ok();
        let page: PaginatedResponse<ReservationResponse> = response.json();
        assert_eq!(page.total_count, 2);
        let ids: Vec<_> = page.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);

        let response = get_as(&app, &manager, &format!("/api/v1/rooms/{}/reservations?status=confirmed", room.id)).await;
        let page: PaginatedResponse<ReservationResponse> = response.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].id, later.id);

        get_as(&app, &manager, &format!("/api/v1/rooms/{}/reservations", Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_password_visible_only_to_owner_once_confirmed(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(1)).await;
        let path = format!("/api/v1/rooms/{}/reservations/{}", room.id, reservation.id);

        let pending: ReservationResponse = get_as(&app, &owner, &path).await.json();
        assert!(pending.room_password.is_none());

        set_status(&pool, reservation.id, ReservationStatus::Confirmed).await;

        let as_owner: ReservationResponse = get_as(&app, &owner, &path).await.json();
        assert_eq!(as_owner.room_password.as_deref(), Some(reservation.room_password.as_str()));
        assert_eq!(reservation.room_password.len(), 10);

        let as_manager: ReservationResponse = get_as(&app, &manager, &path).await.json();
        assert!(as_manager.room_password.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_reservation_under_wrong_room_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let other_room = create_test_room(&pool, manager.id, "Red").await;
        let reservation = create_test_reservation(&pool, room.id, manager.id, days_from_today(1), days_from_today(1)).await;

        get_as(&app, &manager, &format!("/api/v1/rooms/{}/reservations/{}", other_room.id, reservation.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        post_as(
            &app,
            &manager,
            &format!("/api/v1/rooms/{}/reservations/{}/confirm", other_room.id, reservation.id),
            json!({"status": "confirmed"}),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_is_always_forbidden(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, owner.id, "Blue").await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(1)).await;
        let auth = add_auth_headers(&owner);

        let response = app
            .delete(&format!("/api/v1/rooms/{}/reservations/{}", room.id, reservation.id))
            .add_header(auth[0].0.clone(), auth[0].1.clone())
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(message(&response), "Delete function is not offered in this path.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_only_room_manager_confirms(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(2)).await;
        let path = format!("/api/v1/rooms/{}/reservations/{}/confirm", room.id, reservation.id);

        post_as(&app, &owner, &path, json!({"status": "confirmed"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = post_as(&app, &manager, &path, json!({"status": "confirmed"})).await;
        response.assert_status_ok();
        let body: ReservationActionResponse = response.json();
        assert_eq!(body.message, "Status is changed");
        assert_eq!(body.reservation.status, ReservationStatus::Confirmed);
        // The manager is not the owner, so no password
        assert!(body.reservation.room_password.is_none());

        // Confirmed can only go on to cancelled
        post_as(&app, &manager, &path, json!({"status": "rejected"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        post_as(&app, &manager, &path, json!({"status": "pending"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = post_as(&app, &manager, &path, json!({"status": "cancelled"})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<ReservationActionResponse>().reservation.status, ReservationStatus::Cancelled);

        post_as(&app, &manager, &path, json!({"status": "confirmed"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_confirm_rechecks_overlap(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let first = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(3)).await;
        let second = create_test_reservation(&pool, room.id, owner.id, days_from_today(3), days_from_today(4)).await;

        post_as(
            &app,
            &manager,
            &format!("/api/v1/rooms/{}/reservations/{}/confirm", room.id, first.id),
            json!({"status": "confirmed"}),
        )
        .await
        .assert_status_ok();

        let response = post_as(
            &app,
            &manager,
            &format!("/api/v1/rooms/{}/reservations/{}/confirm", room.id, second.id),
            json!({"status": "confirmed"}),
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Room is reserved at this term");

        // Rejecting needs no free slot
        post_as(
            &app,
            &manager,
            &format!("/api/v1/rooms/{}/reservations/{}/confirm", room.id, second.id),
            json!({"status": "rejected"}),
        )
        .await
        .assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_only_owner_cancels(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(2)).await;
        set_status(&pool, reservation.id, ReservationStatus::Confirmed).await;
        let path = format!("/api/v1/rooms/{}/reservations/{}/cancel", room.id, reservation.id);

        post_as(&app, &manager, &path, json!({})).await.assert_status(StatusCode::FORBIDDEN);

        let response = post_as(&app, &owner, &path, json!({})).await;
        response.assert_status_ok();
        let body: ReservationActionResponse = response.json();
        assert_eq!(body.message, "Reservation is canceled");
        assert_eq!(body.reservation.status, ReservationStatus::Cancelled);
        // Cancelled, so the password is hidden again
        assert!(body.reservation.room_password.is_none());

        post_as(&app, &owner, &path, json!({})).await.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_finish_rules(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;

        let upcoming = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(2)).await;
        set_status(&pool, upcoming.id, ReservationStatus::Confirmed).await;
        let response = post_as(
            &app,
            &owner,
            &format!("/api/v1/rooms/{}/reservations/{}/finish", room.id, upcoming.id),
            json!({"rating": 4}),
        )
        .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "You can add evaluation after training.");

        let past = create_test_reservation(&pool, room.id, owner.id, days_from_today(-5), days_from_today(-3)).await;
        let path = format!("/api/v1/rooms/{}/reservations/{}/finish", room.id, past.id);

        // Still pending
        post_as(&app, &owner, &path, json!({"rating": 4})).await.assert_status(StatusCode::BAD_REQUEST);

        set_status(&pool, past.id, ReservationStatus::Confirmed).await;

        post_as(&app, &manager, &path, json!({"rating": 4})).await.assert_status(StatusCode::FORBIDDEN);
        post_as(&app, &owner, &path, json!({"rating": 6})).await.assert_status(StatusCode::BAD_REQUEST);

        let response = post_as(&app, &owner, &path, json!({"rating": 4})).await;
        response.assert_status_ok();
        let body: ReservationActionResponse = response.json();
        assert_eq!(body.message, "The training has been assessed");
        assert_eq!(body.reservation.rating, Some(4));
        assert_eq!(body.reservation.status, ReservationStatus::Confirmed);

        let response = post_as(&app, &owner, &path, json!({"rating": 5})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "You can add evaluation only once.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_edits_pending_only(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let blocker = create_test_reservation(&pool, room.id, manager.id, days_from_today(10), days_from_today(12)).await;
        set_status(&pool, blocker.id, ReservationStatus::Confirmed).await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(2)).await;
        let path = format!("/api/v1/rooms/{}/reservations/{}", room.id, reservation.id);
        let owner_auth = add_auth_headers(&owner);
        let manager_auth = add_auth_headers(&manager);

        app.patch(&path)
            .add_header(manager_auth[0].0.clone(), manager_auth[0].1.clone())
            .json(&json!({"training": "Hijack"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = app
            .patch(&path)
            .add_header(owner_auth[0].0.clone(), owner_auth[0].1.clone())
            .json(&json!({"date_to": days_from_today(11)}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Room is reserved at this term");

        let response = app
            .patch(&path)
            .add_header(owner_auth[0].0.clone(), owner_auth[0].1.clone())
            .json(&json!({"training": "Workshop", "date_to": days_from_today(3)}))
            .await;
        response.assert_status_ok();
        let updated: ReservationResponse = response.json();
        assert_eq!(updated.training, "Workshop");
        assert_eq!(updated.date_to, days_from_today(3));
        assert_eq!(updated.date_from, days_from_today(1));

        set_status(&pool, reservation.id, ReservationStatus::Confirmed).await;
        let response = app
            .patch(&path)
            .add_header(owner_auth[0].0.clone(), owner_auth[0].1.clone())
            .json(&json!({"comment": "too late"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Only pending reservations can be changed");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_clears_comment_with_null(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let created: ReservationResponse = post_as(
            &app,
            &owner,
            &format!("/api/v1/rooms/{}/reservations", room.id),
            json!({"date_from": days_from_today(1), "date_to": days_from_today(2), "comment": "bring snacks"}),
        )
        .await
        .json();
        let path = format!("/api/v1/rooms/{}/reservations/{}", room.id, created.id);
        let auth = add_auth_headers(&owner);

        // Omitting the field keeps it
        let response = app
            .patch(&path)
            .add_header(auth[0].0.clone(), auth[0].1.clone())
            .json(&json!({"training": "Workshop"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<ReservationResponse>().comment.as_deref(), Some("bring snacks"));

        let response = app
            .patch(&path)
            .add_header(auth[0].0.clone(), auth[0].1.clone())
            .json(&json!({"comment": null}))
            .await;
        response.assert_status_ok();
        let updated: ReservationResponse = response.json();
        assert!(updated.comment.is_none());
        assert_eq!(updated.training, "Workshop");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_malformed_bodies_are_json_bad_requests(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let owner = create_test_user(&pool, Role::StandardUser).await;
        let room = create_test_room(&pool, manager.id, "Blue").await;
        let reservation = create_test_reservation(&pool, room.id, owner.id, days_from_today(1), days_from_today(2)).await;
        let base = format!("/api/v1/rooms/{}/reservations", room.id);

        let response = post_as(&app, &manager, &format!("{base}/{}/confirm", reservation.id), json!({"status": "done"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(message(&response).contains("status"));

        let response = post_as(&app, &owner, &format!("{base}/{}/finish", reservation.id), json!({"rating": 4.5})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(message(&response).contains("rating"));

        let response = post_as(&app, &owner, &base, json!({"date_from": "next tuesday", "date_to": days_from_today(2)})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!message(&response).is_empty());

        // Nothing above touched the reservation
        let unchanged: ReservationResponse = get_as(&app, &owner, &format!("{base}/{}", reservation.id)).await.json();
        assert_eq!(unchanged.status, ReservationStatus::Pending);
        assert!(unchanged.rating.is_none());
    }
}
