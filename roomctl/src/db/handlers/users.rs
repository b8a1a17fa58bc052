//! Database repository for users.

use crate::types::{UserId, abbrev_uuid};
use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub auth_source: String,
    pub is_admin: bool,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

const USER_COLUMNS: &str = "id, username, email, display_name, auth_source, is_admin, password_hash, created_at, updated_at, last_login";

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl From<(Vec<Role>, User)> for UserDBResponse {
    fn from((roles, user): (Vec<Role>, User)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            auth_source: user.auth_source,
            is_admin: user.is_admin,
            roles,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
        }
    }
}

/// StandardUser is implied for everyone; make it explicit and drop duplicates.
fn normalize_roles(roles: &[Role]) -> Vec<Role> {
    let mut normalized = vec![Role::StandardUser];
    for role in roles {
        if !normalized.contains(role) {
            normalized.push(*role);
        }
    }
    normalized
}

async fn fetch_roles(conn: &mut PgConnection, user_id: UserId) -> Result<Vec<Role>> {
    let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(roles)
}

async fn replace_roles(conn: &mut PgConnection, user_id: UserId, roles: &[Role]) -> Result<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for role in roles {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user_id = Uuid::new_v4();
        let roles = normalize_roles(&request.roles);

        // User row and roles go in together
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, display_name, auth_source, is_admin, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(&request.auth_source)
        .bind(request.is_admin)
        .bind(&request.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        replace_roles(&mut tx, user_id, &roles).await?;
        tx.commit().await?;

        Ok(UserDBResponse::from((roles, user)))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => {
                let roles = fetch_roles(&mut *self.db, user.id).await?;
                Ok(Some(UserDBResponse::from((roles, user))))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let roles = fetch_roles(&mut *self.db, user.id).await?;
            result.push(UserDBResponse::from((roles, user)));
        }
        Ok(result)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // This update touches multiple tables, so regardless of the connection passed in, we still need a transaction.
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                password_hash = COALESCE($3, password_hash),
                is_admin = COALESCE($4, is_admin),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.password_hash)
        .bind(request.is_admin)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(roles) = &request.roles {
            replace_roles(&mut tx, id, &normalize_roles(roles)).await?;
        }

        let roles = fetch_roles(&mut tx, id).await?;
        tx.commit().await?;

        Ok(UserDBResponse::from((roles, user)))
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => {
                let roles = fetch_roles(&mut *self.db, user.id).await?;
                Ok(Some(UserDBResponse::from((roles, user))))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn record_login(&mut self, id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }
}
