//! # roomctl: meeting room booking API
//!
//! `roomctl` is an HTTP API for booking meeting rooms. Users create rooms (becoming their room
//! manager), book them for date ranges, and walk each reservation through a small lifecycle:
//! the room manager confirms or rejects it, the owner may cancel it, and once the training is over
//! the owner rates it.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for all persistence.
//!
//! ### Request flow
//!
//! A request first resolves its caller in the [`CurrentUser`](api::models::users::CurrentUser)
//! extractor: a signed session cookie (native login) or a trusted proxy header carrying the
//! caller's email. Handlers then check role permissions through
//! [`RequiresPermission`](auth::permissions::RequiresPermission) or the ownership helpers in
//! [`auth::permissions`], open a transaction, and talk to the repositories in [`db::handlers`].
//!
//! Reservation rules (date validation, overlap with confirmed bookings, who may move a reservation
//! to which status, the one-time rating) live in [`booking`] as pure functions, so handlers only
//! gather inputs under lock and persist the answer.
//!
//! ### Concurrency
//!
//! Every reservation write locks its room row (`SELECT ... FOR UPDATE`) before reading the
//! confirmed ranges it checks against. Two confirmations on the same room therefore serialize and
//! cannot both succeed for overlapping dates.
//!
//! ## Getting started
//!
//! ```no_run
//! use roomctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     roomctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! }
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from a YAML file (default `config.yaml`) and `ROOMCTL_`-prefixed
//! environment variables, with `DATABASE_URL` honoured as a shortcut. See [`config`].

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
};
use axum::http::HeaderValue;
use axum::{
    Router, http,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ReservationId, RoomId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the roomctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: an existing user with this email keeps its account and only has its password
/// replaced when one is given.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_blocking(pwd.to_string()).await?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &UserUpdateDBRequest {
                        password_hash,
                        ..Default::default()
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: email.to_string(),
            email: email.to_string(),
            display_name: None,
            is_admin: true,
            roles: vec![Role::PlatformManager],
            auth_source: "system".to_string(),
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!(user_id = %created_user.id, "Created initial admin user");
    Ok(created_user.id)
}

/// Connect to the configured database and run migrations
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(secs(settings.idle_timeout_secs))
        .max_lifetime(secs(settings.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.auth.security.cors.allowed_origins;

    // tower-http rejects "*" inside an origin list
    let allow_origin = if allowed.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: authentication routes at the root, the resource API under
/// `/api/v1`, docs, CORS and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{auth, reservations, rooms, users};

    // Authentication routes (at root level, can be masked when deployed behind SSO proxy)
    let auth_routes = Router::new()
        .route("/authentication/register", get(auth::get_registration_info).post(auth::register))
        .route("/authentication/login", get(auth::get_login_info).post(auth::login))
        .route("/authentication/logout", post(auth::logout))
        .route("/authentication/password-change", post(auth::change_password))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/current", get(users::get_current_user))
        .route(
            "/users/{user_id}",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        )
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/{room_id}",
            get(rooms::get_room).patch(rooms::update_room).delete(rooms::delete_room),
        )
        .route(
            "/rooms/{room_id}/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/rooms/{room_id}/reservations/{reservation_id}",
            get(reservations::get_reservation)
                .patch(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route(
            "/rooms/{room_id}/reservations/{reservation_id}/confirm",
            post(reservations::confirm_reservation),
        )
        .route(
            "/rooms/{room_id}/reservations/{reservation_id}/cancel",
            post(reservations::cancel_reservation),
        )
        .route(
            "/rooms/{room_id}/reservations/{reservation_id}/finish",
            post(reservations::finish_reservation),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Tracing wraps CORS so preflight responses are traced too
    let router = router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(create_cors_layer(&state.config)?),
    );

    Ok(router)
}

/// The assembled service: state, router and the pool it owns.
///
/// 1. **Create**: [`Application::new`] connects, runs migrations and ensures the initial admin
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain and the pool closes
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse `pool` instead of connecting (migrations still run)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting roomctl with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "roomctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
