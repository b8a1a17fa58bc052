//! Database repository for rooms.

use crate::types::{RoomId, UserId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::rooms::{RoomCreateDBRequest, RoomDBResponse, RoomUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing rooms
#[derive(Debug, Clone)]
pub struct RoomFilter {
    pub skip: i64,
    pub limit: i64,
    /// Only rooms managed by this user
    pub room_manager: Option<UserId>,
}

impl RoomFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            room_manager: None,
        }
    }

    pub fn with_room_manager(mut self, room_manager: UserId) -> Self {
        self.room_manager = Some(room_manager);
        self
    }
}

const ROOM_COLUMNS: &str = "id, name, room_manager, created_at, updated_at";

pub struct Rooms<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Rooms<'c> {
    type CreateRequest = RoomCreateDBRequest;
    type UpdateRequest = RoomUpdateDBRequest;
    type Response = RoomDBResponse;
    type Id = RoomId;
    type Filter = RoomFilter;

    #[instrument(skip(self, request), fields(name = %request.name, room_manager = %abbrev_uuid(&request.room_manager)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let room = sqlx::query_as::<_, RoomDBResponse>(&format!(
            "INSERT INTO rooms (id, name, room_manager) VALUES ($1, $2, $3) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.room_manager)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(room)
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let room = sqlx::query_as::<_, RoomDBResponse>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room)
    }

    /// Rooms ordered by name
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rooms = sqlx::query_as::<_, RoomDBResponse>(&format!(
            r#"
            SELECT {ROOM_COLUMNS} FROM rooms
            WHERE ($1::uuid IS NULL OR room_manager = $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.room_manager)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rooms)
    }

    /// Reservations go with the room (ON DELETE CASCADE)
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let room = sqlx::query_as::<_, RoomDBResponse>(&format!(
            r#"
            UPDATE rooms SET
                name = COALESCE($2, name),
                room_manager = COALESCE($3, room_manager),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.room_manager)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(room)
    }
}

impl<'c> Rooms<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<RoomDBResponse>> {
        let room = sqlx::query_as::<_, RoomDBResponse>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE name = $1"))
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room)
    }

    /// Fetch the room and hold its row lock until the surrounding transaction ends.
    ///
    /// Every reservation mutation takes this lock first, which serializes overlap checks per room.
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    pub async fn lock(&mut self, id: RoomId) -> Result<Option<RoomDBResponse>> {
        let room = sqlx::query_as::<_, RoomDBResponse>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &RoomFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms WHERE ($1::uuid IS NULL OR room_manager = $1)")
            .bind(filter.room_manager)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::create_test_user;
    use sqlx::PgPool;

    fn room(name: &str, manager: UserId) -> RoomCreateDBRequest {
        RoomCreateDBRequest {
            name: name.to_string(),
            room_manager: manager,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_room(pool: PgPool) {
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        let created = repo.create(&room("Blue", manager.id)).await.unwrap();
        assert_eq!(created.name, "Blue");
        assert_eq!(created.room_manager, manager.id);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(repo.get_by_name("Blue").await.unwrap().unwrap().id, created.id);
        assert!(repo.get_by_name("Green").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_rejected(pool: PgPool) {
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        repo.create(&room("Blue", manager.id)).await.unwrap();
        let err = repo.create(&room("Blue", manager.id)).await.unwrap_err();
        assert!(err.is_unique_violation_of("rooms_name_unique"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_manager_is_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        let err = repo.create(&room("Orphan", Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_orders_by_name_and_filters(pool: PgPool) {
        let alice = create_test_user(&pool, Role::StandardUser).await;
        let bob = create_test_user(&pool, Role::StandardUser).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        for (name, manager) in [("Charlie", alice.id), ("Alpha", bob.id), ("Bravo", alice.id)] {
            repo.create(&room(name, manager)).await.unwrap();
        }

        let names: Vec<String> = repo
            .list(&RoomFilter::new(0, 10))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);

        let filter = RoomFilter::new(0, 10).with_room_manager(alice.id);
        assert_eq!(repo.count(&filter).await.unwrap(), 2);
        assert_eq!(repo.list(&filter).await.unwrap()[0].name, "Bravo");

        let page = repo.list(&RoomFilter::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Bravo");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete(pool: PgPool) {
        let alice = create_test_user(&pool, Role::StandardUser).await;
        let bob = create_test_user(&pool, Role::StandardUser).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        let created = repo.create(&room("Blue", alice.id)).await.unwrap();

        let renamed = repo
            .update(
                created.id,
                &RoomUpdateDBRequest {
                    name: Some("Indigo".to_string()),
                    room_manager: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Indigo");
        assert_eq!(renamed.room_manager, alice.id);

        let reassigned = repo
            .update(
                created.id,
                &RoomUpdateDBRequest {
                    name: None,
                    room_manager: Some(bob.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(reassigned.name, "Indigo");
        assert_eq!(reassigned.room_manager, bob.id);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.update(created.id, &RoomUpdateDBRequest::default()).await.unwrap_err(),
            DbError::NotFound
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lock_returns_room_inside_transaction(pool: PgPool) {
        let manager = create_test_user(&pool, Role::StandardUser).await;
        let mut tx = pool.begin().await.unwrap();
        let created = Rooms::new(&mut tx).create(&room("Locked", manager.id)).await.unwrap();

        let locked = Rooms::new(&mut tx).lock(created.id).await.unwrap();
        assert_eq!(locked.map(|r| r.id), Some(created.id));
        assert!(Rooms::new(&mut tx).lock(Uuid::new_v4()).await.unwrap().is_none());
        tx.commit().await.unwrap();
    }
}
