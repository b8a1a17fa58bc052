//! OpenAPI documentation for the booking API.
//!
//! [`ApiDoc`] covers the `/authentication/*` endpoints directly and nests [`ResourcesApiDoc`]
//! (users, rooms, reservations) under `/api/v1`. The rendered document is served at
//! `/api-docs/openapi.json` and browsable at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::booking::ReservationStatus;

/// Session cookie and trusted proxy header, matching the two ways a request can authenticate.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "CookieAuth".to_string(),
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "roomctl_session",
                "Session cookie set by `/authentication/login` or `/authentication/register`",
            ))),
        );
        components.security_schemes.insert(
            "X-Roomctl-User".to_string(),
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "x-roomctl-user",
                "Email of the caller, set by a trusted authenticating proxy",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::users::list_users,
        api::handlers::users::get_current_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::rooms::list_rooms,
        api::handlers::rooms::create_room,
        api::handlers::rooms::get_room,
        api::handlers::rooms::update_room,
        api::handlers::rooms::delete_room,
        api::handlers::reservations::list_reservations,
        api::handlers::reservations::create_reservation,
        api::handlers::reservations::get_reservation,
        api::handlers::reservations::update_reservation,
        api::handlers::reservations::delete_reservation,
        api::handlers::reservations::confirm_reservation,
        api::handlers::reservations::cancel_reservation,
        api::handlers::reservations::finish_reservation,
    ),
    components(
        schemas(
            api::models::users::Role,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::rooms::RoomCreate,
            api::models::rooms::RoomUpdate,
            api::models::rooms::RoomResponse,
            api::models::reservations::ReservationCreate,
            api::models::reservations::ReservationUpdate,
            api::models::reservations::ConfirmRequest,
            api::models::reservations::FinishRequest,
            api::models::reservations::ReservationResponse,
            api::models::reservations::ReservationActionResponse,
            ReservationStatus,
        )
    ),
    tags(
        (name = "users", description = "User accounts and roles"),
        (name = "rooms", description = "Rooms and their managers"),
        (name = "reservations", description = "Booking a room and the confirm/cancel/finish lifecycle"),
    )
)]
pub struct ResourcesApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "roomctl",
        description = "Book meeting rooms. Room managers confirm or reject reservations, owners cancel them and rate the training afterwards."
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/api/v1", api = ResourcesApiDoc)
    ),
    paths(
        api::handlers::auth::get_registration_info,
        api::handlers::auth::register,
        api::handlers::auth::get_login_info,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::change_password,
    ),
    components(
        schemas(
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::ChangePasswordRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::auth::RegistrationInfo,
            api::models::auth::LoginInfo,
        )
    ),
    tags(
        (name = "authentication", description = "Native login, registration and sessions"),
    )
)]
pub struct ApiDoc;
