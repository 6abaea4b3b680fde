// foodgram_server/src/services/auth_service.rs

//! Password hashing and verification for registration and password change.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a plain-text password into an Argon2 PHC string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::validation(
      "password",
      format!("Password must be at least {} characters long.", MIN_PASSWORD_LEN),
    ));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable.
#[instrument(
  name = "auth_service::verify_password",
  skip(hashed_password_str, provided_password),
  err(Display),
  fields(hash_len = hashed_password_str.len())
)]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}
