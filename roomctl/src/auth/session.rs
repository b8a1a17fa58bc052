//! JWT session tokens and the cookie that carries them.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::{CurrentUser, Role},
    config::Config,
    errors::Error,
    types::UserId,
};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub email: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub is_admin: bool,
    pub display_name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(user: &CurrentUser, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.security.jwt_expiry;

        Self {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            roles: user.roles.clone(),
            is_admin: user.is_admin,
            display_name: user.display_name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            username: claims.username,
            roles: claims.roles,
            is_admin: claims.is_admin,
            display_name: claims.display_name,
        }
    }
}

fn secret_key(config: &Config) -> Result<&[u8], Error> {
    config
        .secret_key
        .as_ref()
        .map(|key| key.as_bytes())
        .ok_or_else(|| Error::Internal {
            operation: "JWT sessions: secret_key is required".to_string(),
        })
}

pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);
    let key = EncodingKey::from_secret(secret_key(config)?);
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify a token. Anything the client could have caused (bad signature, expiry, garbage) is
/// `Unauthenticated`; key and encoding problems on our side are `Internal`.
pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?);

    let token_data = decode::<SessionClaims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },
        _ => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },
    })?;

    Ok(CurrentUser::from(token_data.claims))
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.native.session;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        secure,
        session.cookie_same_site,
        session.timeout.as_secs()
    )
}

/// `Set-Cookie` value that clears the session
pub fn expired_session_cookie(config: &Config) -> String {
    let session = &config.auth.native.session;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}=; Path=/; HttpOnly{}; SameSite={}; Max-Age=0",
        session.cookie_name, secure, session.cookie_same_site
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn create_test_config() -> Config {
        let mut config = Config {
            secret_key: Some("test-secret-key-for-jwt".to_string()),
            ..Default::default()
        };
        config.auth.security.jwt_expiry = Duration::from_secs(3600);
        config
    }

    fn create_test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            roles: vec![Role::StandardUser],
            is_admin: false,
            display_name: Some("Test User".to_string()),
        }
    }

    #[test]
    fn test_create_and_verify_session_token() {
        let config = create_test_config();
        let user = create_test_user();

        let token = create_session_token(&user, &config).unwrap();
        let verified = verify_session_token(&token, &config).unwrap();

        assert_eq!(verified.id, user.id);
        assert_eq!(verified.email, user.email);
        assert_eq!(verified.username, user.username);
        assert_eq!(verified.roles, user.roles);
        assert_eq!(verified.display_name, user.display_name);
        assert!(!verified.is_admin);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_session_token(&create_test_user(), &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let err = verify_session_token(&token, &config).unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let user = create_test_user();

        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            roles: user.roles.clone(),
            is_admin: false,
            display_name: None,
            exp: (now - chrono::Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        };
        let key = EncodingKey::from_secret(b"test-secret-key-for-jwt");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let err = verify_session_token(&token, &config).unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_malformed_tokens() {
        let config = create_test_config();
        for token in ["not.a.token", "invalid", "", "too.many.parts.in.this.token"] {
            let err = verify_session_token(token, &config).unwrap_err();
            assert!(matches!(err, Error::Unauthenticated { .. }), "token {token:?} gave {err:?}");
        }
    }

    #[test]
    fn test_missing_secret_is_internal() {
        let config = Config::default();
        let err = create_session_token(&create_test_user(), &config).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn test_cookies() {
        let mut config = create_test_config();
        let cookie = session_cookie("abc", &config);
        assert!(cookie.starts_with("roomctl_session=abc; Path=/; HttpOnly; Secure"));
        assert!(cookie.ends_with("Max-Age=86400"));

        config.auth.native.session.cookie_secure = false;
        let cleared = expired_session_cookie(&config);
        assert_eq!(cleared, "roomctl_session=; Path=/; HttpOnly; SameSite=strict; Max-Age=0");
    }
}
