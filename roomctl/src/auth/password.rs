//! Password hashing and verification.
//!
//! Argon2id with a random salt; the PHC string stores its own parameters, so verification does not
//! need them. Both operations are CPU-heavy and should run on a blocking thread
//! (see [`hash_blocking`] and [`verify_blocking`]).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordConfig;
use crate::errors::Error;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

pub fn hash_string_with_params(input: &str, params: Argon2Params) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params.to_argon2()?.hash_password(input.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })?;

    Ok(hash.to_string())
}

pub fn hash_string(input: &str) -> Result<String, Error> {
    hash_string_with_params(input, Argon2Params::default())
}

/// Check `input` against a stored PHC hash.
pub fn verify_string(input: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    Ok(Argon2::default().verify_password(input.as_bytes(), &parsed_hash).is_ok())
}

/// Hash on the blocking pool
pub async fn hash_blocking(input: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || hash_string(&input))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Verify on the blocking pool
pub async fn verify_blocking(input: String, hash: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || verify_string(&input, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?
}

/// Enforce the configured length bounds on a new password.
pub fn validate_length(password: &str, config: &PasswordConfig) -> Result<(), Error> {
    let length = password.chars().count();
    if length < config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", config.min_length),
        });
    }
    if length > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", config.max_length),
        });
    }
    Ok(())
}
