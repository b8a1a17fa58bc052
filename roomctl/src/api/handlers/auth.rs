use axum::{Json, extract::State};

use crate::{
    AppState,
    api::extract::JsonBody,
    api::models::{
        auth::{
            AuthResponse, AuthSuccessResponse, ChangePasswordRequest, LoginInfo, LoginRequest, LoginResponse, LogoutResponse,
            RegisterRequest, RegisterResponse, RegistrationInfo,
        },
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

fn require_native_auth(state: &AppState) -> Result<(), Error> {
    if state.config.auth.native.enabled {
        Ok(())
    } else {
        Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        })
    }
}

/// Get registration information
#[utoipa::path(
    get,
    path = "/authentication/register",
    tag = "authentication",
    responses(
        (status = 200, description = "Registration info", body = RegistrationInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_registration_info(State(state): State<AppState>) -> Result<Json<RegistrationInfo>, Error> {
    let enabled = state.config.auth.native.enabled && state.config.auth.native.allow_registration;
    Ok(Json(RegistrationInfo {
        enabled,
        message: if enabled {
            "Registration is enabled".to_string()
        } else {
            "Registration is disabled".to_string()
        },
    }))
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 400, description = "Username or email already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, JsonBody(request): JsonBody<RegisterRequest>) -> Result<RegisterResponse, Error> {
    require_native_auth(&state)?;
    if !state.config.auth.native.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(Error::BadRequest {
            message: "Username and email are required".to_string(),
        });
    }
    password::validate_length(&request.password, &state.config.auth.native.password)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_user_by_email(email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "An account with this email address already exists".to_string(),
        });
    }

    let password_hash = password::hash_blocking(request.password).await?;
    let create_request = UserCreateDBRequest {
        username: username.to_string(),
        email: email.to_string(),
        display_name: request.display_name,
        is_admin: false,
        roles: vec![Role::StandardUser],
        auth_source: "native".to_string(),
        password_hash: Some(password_hash),
    };

    let created_user = user_repo.create(&create_request).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let user_response = UserResponse::from(created_user);
    let token = session::create_session_token(&user_response.clone().into(), &state.config)?;

    Ok(RegisterResponse {
        auth_response: AuthResponse {
            user: user_response,
            message: "Registration successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Get login information
#[utoipa::path(
    get,
    path = "/authentication/login",
    tag = "authentication",
    responses(
        (status = 200, description = "Login info", body = LoginInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_login_info(State(state): State<AppState>) -> Result<Json<LoginInfo>, Error> {
    Ok(Json(LoginInfo {
        enabled: state.config.auth.native.enabled,
        message: if state.config.auth.native.enabled {
            "Native login is enabled".to_string()
        } else {
            "Native login is disabled".to_string()
        },
    }))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> Result<LoginResponse, Error> {
    require_native_auth(&state)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo
        .get_user_by_email(request.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    // Proxy-header users have no password and cannot log in natively
    let password_hash = user.password_hash.clone().ok_or_else(invalid_credentials)?;
    if !password::verify_blocking(request.password, password_hash).await? {
        return Err(invalid_credentials());
    }

    user_repo.record_login(user.id).await?;

    let user_response = UserResponse::from(user);
    let token = session::create_session_token(&user_response.clone().into(), &state.config)?;

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: user_response,
            message: "Login successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::expired_session_cookie(&state.config),
    })
}

/// Change password for authenticated user
#[utoipa::path(
    post,
    path = "/authentication/password-change",
    request_body = ChangePasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password changed successfully", body = AuthSuccessResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Current password is incorrect"),
    ),
    security(
        ("CookieAuth" = []),
        ("X-Roomctl-User" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    require_native_auth(&state)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo.get_by_id(current_user.id).await?.ok_or_else(|| Error::Unauthenticated {
        message: Some("User not found".to_string()),
    })?;

    let password_hash = user.password_hash.ok_or_else(|| Error::BadRequest {
        message: "Cannot change password for non-native authentication users".to_string(),
    })?;

    if !password::verify_blocking(request.current_password, password_hash).await? {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    password::validate_length(&request.new_password, &state.config.auth.native.password)?;
    let new_password_hash = password::hash_blocking(request.new_password).await?;

    let update_request = UserUpdateDBRequest {
        password_hash: Some(new_password_hash),
        ..Default::default()
    };
    user_repo.update(current_user.id, &update_request).await?;

    Ok(Json(AuthSuccessResponse {
        message: "Password changed successfully".to_string(),
    }))
}
