//! Test utilities for integration testing (available with `test-utils` feature).

use crate::config::{NativeAuthConfig, PoolSettings, ProxyHeaderAuthConfig, SecurityConfig};
use crate::{
    api::models::users::{Role, UserResponse},
    booking::generate_room_password,
    db::{
        handlers::{Repository, Reservations, Rooms, Users},
        models::{
            reservations::{ReservationCreateDBRequest, ReservationDBResponse},
            rooms::{RoomCreateDBRequest, RoomDBResponse},
            users::UserCreateDBRequest,
        },
    },
    types::{RoomId, UserId},
};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

#[cfg(test)]
pub async fn create_test_app(pool: PgPool) -> axum_test::TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

#[cfg(test)]
pub async fn create_test_app_with_config(pool: PgPool, config: crate::config::Config) -> axum_test::TestServer {
    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

/// Proxy-header auth on (so tests can pick a user per request), native auth on with a fixed
/// secret, and a single-connection pool.
pub fn create_test_config() -> crate::config::Config {
    crate::config::Config {
        database_url: None,
        database: crate::config::DatabaseConfig {
            // Will get overriden by the test pool
            url: "Something".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
        },
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            native: NativeAuthConfig {
                enabled: true,
                allow_registration: true,
                ..Default::default()
            },
            proxy_header: ProxyHeaderAuthConfig {
                enabled: true,
                ..Default::default()
            },
            security: SecurityConfig::default(),
        },
        reservations: crate::config::ReservationsConfig::default(),
        enable_otel_export: false,
    }
}

async fn insert_user(pool: &PgPool, prefix: &str, display_name: &str, is_admin: bool, roles: Vec<Role>) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user_id = Uuid::new_v4();
    let username = format!("{prefix}_{}", user_id.simple());
    let email = format!("{username}@example.com");

    let user_create = UserCreateDBRequest {
        username,
        email,
        display_name: Some(display_name.to_string()),
        is_admin,
        roles,
        auth_source: "test".to_string(),
        password_hash: None,
    };

    let user = users_repo.create(&user_create).await.expect("Failed to create test user");
    UserResponse::from(user)
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserResponse {
    insert_user(pool, "testuser", "Test User", false, vec![role]).await
}

pub async fn create_test_admin_user(pool: &PgPool, role: Role) -> UserResponse {
    insert_user(pool, "testadmin", "Test Admin User", true, vec![role]).await
}

/// Headers that authenticate `user` through the proxy header
pub fn add_auth_headers(user: &UserResponse) -> Vec<(String, String)> {
    let config = ProxyHeaderAuthConfig::default();
    vec![(config.header_name, user.email.clone())]
}

pub async fn create_test_room(pool: &PgPool, room_manager: UserId, name: &str) -> RoomDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut rooms_repo = Rooms::new(&mut conn);

    rooms_repo
        .create(&RoomCreateDBRequest {
            name: name.to_string(),
            room_manager,
        })
        .await
        .expect("Failed to create test room")
}

/// Insert a pending reservation directly, bypassing the date rules (so tests can book the past)
pub async fn create_test_reservation(
    pool: &PgPool,
    room_id: RoomId,
    owner_id: UserId,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> ReservationDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut reservations_repo = Reservations::new(&mut conn);

    reservations_repo
        .create(&ReservationCreateDBRequest {
            room_id,
            owner_id,
            date_from,
            date_to,
            training: "Test".to_string(),
            comment: None,
            room_password: generate_room_password(crate::booking::DEFAULT_PASSWORD_LENGTH),
        })
        .await
        .expect("Failed to create test reservation")
}
