//! Database repository for reservations.
//!
//! Reservations do not implement [`super::Repository`]: they are always addressed through their
//! room, and their status only changes through the lifecycle operations in [`crate::booking`].

use crate::booking::{DateRange, Rating, ReservationStatus};
use crate::db::{
    errors::{DbError, Result},
    models::reservations::{ReservationCreateDBRequest, ReservationDBResponse, ReservationDetailsDBUpdate},
};
use crate::types::{ReservationId, RoomId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing a room's reservations
#[derive(Debug, Clone)]
pub struct ReservationFilter {
    pub room_id: RoomId,
    pub status: Option<ReservationStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl ReservationFilter {
    pub fn new(room_id: RoomId, skip: i64, limit: i64) -> Self {
        Self {
            room_id,
            status: None,
            skip,
            limit,
        }
    }

    pub fn with_status(mut self, status: Option<ReservationStatus>) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, FromRow)]
struct ConfirmedRange {
    date_from: NaiveDate,
    date_to: NaiveDate,
}

// Every read joins the owner's username so responses can show it
const RESERVATION_SELECT: &str = r#"
    SELECT r.id, r.room_id, r.owner_id, u.username AS owner_username, r.date_from, r.date_to,
           r.training, r.comment, r.rating, r.room_password, r.status, r.created_at, r.updated_at
    FROM reservations r
    JOIN users u ON u.id = r.owner_id
"#;

// Writes return the row through a CTE so the join still applies
const RESERVATION_RETURNING: &str = r#"
    RETURNING id, room_id, owner_id, date_from, date_to, training, comment, rating, room_password, status, created_at, updated_at
"#;

fn select_from_cte(cte: &str) -> String {
    format!(
        r#"
        WITH written AS ({cte})
        SELECT w.id, w.room_id, w.owner_id, u.username AS owner_username, w.date_from, w.date_to,
               w.training, w.comment, w.rating, w.room_password, w.status, w.created_at, w.updated_at
        FROM written w
        JOIN users u ON u.id = w.owner_id
        "#
    )
}

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&request.room_id), owner_id = %abbrev_uuid(&request.owner_id)), err)]
    pub async fn create(&mut self, request: &ReservationCreateDBRequest) -> Result<ReservationDBResponse> {
        let query = select_from_cte(&format!(
            r#"
            INSERT INTO reservations (id, room_id, owner_id, date_from, date_to, training, comment, room_password, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            {RESERVATION_RETURNING}
            "#
        ));

        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&query)
            .bind(Uuid::new_v4())
            .bind(request.room_id)
            .bind(request.owner_id)
            .bind(request.date_from)
            .bind(request.date_to)
            .bind(&request.training)
            .bind(&request.comment)
            .bind(&request.room_password)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: ReservationId) -> Result<Option<ReservationDBResponse>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&format!("{RESERVATION_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(reservation)
    }

    /// Fetch a reservation of the given room and lock its row. A reservation of another room is
    /// treated as missing.
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&room_id), reservation_id = %abbrev_uuid(&id)), err)]
    pub async fn get_for_update(&mut self, room_id: RoomId, id: ReservationId) -> Result<Option<ReservationDBResponse>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            "{RESERVATION_SELECT} WHERE r.id = $1 AND r.room_id = $2 FOR UPDATE OF r"
        ))
        .bind(id)
        .bind(room_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    /// A room's reservations, earliest first
    #[instrument(skip(self, filter), fields(room_id = %abbrev_uuid(&filter.room_id), limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &ReservationFilter) -> Result<Vec<ReservationDBResponse>> {
        let reservations = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            r#"
            {RESERVATION_SELECT}
            WHERE r.room_id = $1 AND ($2::reservation_status IS NULL OR r.status = $2)
            ORDER BY r.date_from, r.created_at
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.room_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    #[instrument(skip(self, filter), fields(room_id = %abbrev_uuid(&filter.room_id)), err)]
    pub async fn count(&mut self, filter: &ReservationFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE room_id = $1 AND ($2::reservation_status IS NULL OR status = $2)",
        )
        .bind(filter.room_id)
        .bind(filter.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    /// Date ranges of the room's confirmed reservations that overlap `window`, optionally
    /// leaving one reservation out (the one being checked against the others).
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&room_id)), err)]
    pub async fn confirmed_in_window(
        &mut self,
        room_id: RoomId,
        window: DateRange,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<DateRange>> {
        let rows = sqlx::query_as::<_, ConfirmedRange>(
            r#"
            SELECT date_from, date_to FROM reservations
            WHERE room_id = $1
              AND status = 'confirmed'
              AND date_from <= $3
              AND $2 <= date_to
              AND ($4::uuid IS NULL OR id <> $4)
            ORDER BY date_from
            "#,
        )
        .bind(room_id)
        .bind(window.from)
        .bind(window.to)
        .bind(exclude)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DateRange {
                from: row.date_from,
                to: row.date_to,
            })
            .collect())
    }

    #[instrument(skip(self, update), fields(reservation_id = %abbrev_uuid(&id)), err)]
    pub async fn update_details(&mut self, id: ReservationId, update: &ReservationDetailsDBUpdate) -> Result<ReservationDBResponse> {
        let query = select_from_cte(&format!(
            r#"
            UPDATE reservations SET
                date_from = $2,
                date_to = $3,
                training = $4,
                comment = $5,
                updated_at = NOW()
            WHERE id = $1
            {RESERVATION_RETURNING}
            "#
        ));

        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&query)
            .bind(id)
            .bind(update.date_from)
            .bind(update.date_to)
            .bind(&update.training)
            .bind(&update.comment)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id), status = %status), err)]
    pub async fn set_status(&mut self, id: ReservationId, status: ReservationStatus) -> Result<ReservationDBResponse> {
        let query = select_from_cte(&format!(
            "UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1 {RESERVATION_RETURNING}"
        ));

        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }

    /// Store the rating. The `rating IS NULL` guard keeps it write-once at the storage level too.
    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id), rating = rating.value()), err)]
    pub async fn set_rating(&mut self, id: ReservationId, rating: Rating) -> Result<ReservationDBResponse> {
        let query = select_from_cte(&format!(
            "UPDATE reservations SET rating = $2, updated_at = NOW() WHERE id = $1 AND rating IS NULL {RESERVATION_RETURNING}"
        ));

        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&query)
            .bind(id)
            .bind(rating.value())
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }
}
