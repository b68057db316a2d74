//! Request-time access checks for protected operations.
//!
//! Both checks run in a fixed order: token presence, signature, permission,
//! and expiry last. An expired token for the wrong account therefore reports
//! `NoPermission`, not `ExpiredToken`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use authapi_core::config::{AdminRoleMatch, AuthConfig};
use authapi_core::error::AppError;

use crate::jwt::{Claims, JwtDecoder};

/// Extracts the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme matched case-insensitively) or a bare
/// token. Returns `None` when the header is absent or carries no token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Verifies bearer tokens against a target account or the admin role.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    decoder: Arc<JwtDecoder>,
    admin_match: AdminRoleMatch,
    leeway_seconds: i64,
}

impl AccessGuard {
    /// Creates a guard from a shared decoder and auth configuration.
    pub fn new(decoder: Arc<JwtDecoder>, config: &AuthConfig) -> Self {
        Self {
            decoder,
            admin_match: config.admin_role_match,
            leeway_seconds: i64::try_from(config.jwt_leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Allows the holder of the token to act on `target_login`: either the
    /// token was issued to that login or its holder is an admin.
    pub fn verify_token(
        &self,
        authorization: Option<&str>,
        target_login: &str,
    ) -> Result<Claims, AppError> {
        self.verify_token_at(authorization, target_login, Utc::now())
    }

    /// Allows only admin token holders, regardless of login.
    pub fn verify_admin(&self, authorization: Option<&str>) -> Result<Claims, AppError> {
        self.verify_admin_at(authorization, Utc::now())
    }

    /// [`verify_token`](Self::verify_token) evaluated at `now`.
    pub fn verify_token_at(
        &self,
        authorization: Option<&str>,
        target_login: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, AppError> {
        let claims = self.authenticate(authorization)?;

        if claims.login != target_login && !claims.is_admin(self.admin_match) {
            debug!(
                login = %claims.login,
                target = %target_login,
                "Token holder may not act on target account"
            );
            return Err(AppError::no_permission());
        }

        self.check_expiry(claims, now)
    }

    /// [`verify_admin`](Self::verify_admin) evaluated at `now`.
    pub fn verify_admin_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, AppError> {
        let claims = self.authenticate(authorization)?;

        if !claims.is_admin(self.admin_match) {
            debug!(login = %claims.login, "Admin role required");
            return Err(AppError::no_permission());
        }

        self.check_expiry(claims, now)
    }

    /// Checks only that a token is present and correctly signed. Permission
    /// and expiry are left to [`verify_token`](Self::verify_token) once the
    /// target account is known.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, AppError> {
        let token = bearer_token(authorization).ok_or_else(AppError::token_not_provided)?;
        self.decoder.decode(token)
    }

    fn check_expiry(&self, claims: Claims, now: DateTime<Utc>) -> Result<Claims, AppError> {
        if claims.is_expired_at(now, self.leeway_seconds) {
            debug!(login = %claims.login, exp = claims.exp, "Token expired");
            return Err(AppError::expired_token());
        }
        Ok(claims)
    }
}
