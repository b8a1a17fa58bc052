//! API request/response models for native authentication.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::UserResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Returned by register and login; the session itself travels in the cookie
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Whether self-registration is open
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationInfo {
    pub enabled: bool,
    pub message: String,
}

/// Whether password login is available
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub enabled: bool,
    pub message: String,
}

/// Register result: 201 with the session cookie set
pub struct RegisterResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, [(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        ([(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Logout result, carrying an already-expired cookie
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        ([(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}
