use crate::db::errors::DbError;
use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie, or only expired/invalid ones
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header is not valid UTF-8
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let Some((name, value)) = cookie.trim().split_once('=') else {
            continue;
        };
        if name != cookie_name {
            continue;
        }
        // Expired tokens are routine, so keep looking rather than failing the request
        if let Ok(user) = session::verify_session_token(value, config) {
            return Some(Ok(user));
        }
    }
    None
}

/// Extract user from the trusted proxy header (its value is the user's email)
/// Returns:
/// - None: No header, or unknown user with auto-creation disabled
/// - Some(Ok(user)): Known or freshly created user
/// - Some(Err(error)): Lookup or creation failed
#[instrument(skip(parts, config, db))]
async fn try_proxy_header_auth(parts: &Parts, config: &Config, db: &PgPool) -> Option<Result<CurrentUser>> {
    let user_email = parts
        .headers
        .get(&config.auth.proxy_header.header_name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())?;

    let mut tx = match db.begin().await {
        Ok(tx) => tx,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };
    let mut user_repo = Users::new(&mut tx);

    let user = match user_repo.get_user_by_email(user_email).await {
        Ok(Some(user)) => CurrentUser::from(user),
        Ok(None) if config.auth.proxy_header.auto_create_users => {
            match user_repo.create(&UserCreateDBRequest::from_proxy_header(user_email)).await {
                Ok(new_user) => {
                    debug!("Auto-created user {} from proxy header", new_user.id);
                    CurrentUser::from(new_user)
                }
                Err(e) => return Some(Err(Error::Database(e))),
            }
        }
        Ok(None) => return None,
        Err(e) => return Some(Err(Error::Database(e))),
    };

    if let Err(e) = tx.commit().await {
        return Some(Err(DbError::from(e).into()));
    }
    Some(Ok(user))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Each method returns None when its credentials are absent. The first success wins; a
        // request that presented something but never authenticated is still just a 401.
        let mut auth_errors = Vec::new();

        if state.config.auth.native.enabled {
            match try_jwt_session_auth(parts, &state.config) {
                Some(Ok(user)) => {
                    debug!("Found JWT session authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => auth_errors.push(("JWT session", e)),
                None => trace!("No JWT session authentication attempted"),
            }
        }

        if state.config.auth.proxy_header.enabled {
            match try_proxy_header_auth(parts, &state.config, &state.db).await {
                Some(Ok(user)) => {
                    debug!("Found proxy header authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => auth_errors.push(("Proxy header", e)),
                None => trace!("No proxy header authentication attempted"),
            }
        }

        if auth_errors.is_empty() {
            trace!("No authentication credentials found in request");
        } else {
            trace!("All authentication attempts failed: {:?}", auth_errors);
        }
        Err(Error::Unauthenticated { message: None })
    }
}
