//! Credential checks applied before registration.

use authapi_core::config::AuthConfig;
use authapi_core::error::AppError;

/// Validates logins and new passwords against configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length.max(1),
        }
    }

    /// Rejects an empty or whitespace-padded login, and any login that could
    /// not name a storage bucket.
    ///
    /// Path separators and control characters are refused here so that no
    /// account row is written for a login whose bucket can never be created.
    pub fn validate_login(&self, login: &str) -> Result<(), AppError> {
        if login.is_empty() {
            return Err(AppError::validation("login must not be empty"));
        }
        if login.trim() != login {
            return Err(AppError::validation(
                "login must not start or end with whitespace",
            ));
        }
        if let Some(c) = login.chars().find(|&c| is_forbidden_login_char(c)) {
            return Err(AppError::validation(format!(
                "login must not contain {c:?}"
            )));
        }
        Ok(())
    }

    /// Validates a password against the minimum length.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}

fn is_forbidden_login_char(c: char) -> bool {
    c == '/' || c == '\\' || c.is_control()
}
