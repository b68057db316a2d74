//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use authapi_core::config::AuthConfig;
use authapi_core::error::AppError;
use authapi_core::types::RoleName;

use super::claims::Claims;

/// Creates signed HS256 access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL.
    ttl: chrono::Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").field("ttl", &self.ttl).finish()
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub access_token: String,
    /// Exact expiry instant (issuance + TTL).
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    ///
    /// Fails when the configured TTL is zero or does not fit a
    /// `chrono::Duration`.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let minutes = config.jwt_access_ttl_minutes;
        let ttl = i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "jwt_access_ttl_minutes out of range: {minutes}"
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl,
        })
    }

    /// Issues a token for `login` carrying a snapshot of `roles`.
    pub fn issue(&self, login: &str, roles: &[RoleName]) -> Result<IssuedToken, AppError> {
        self.issue_at(login, roles, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        login: &str,
        roles: &[RoleName],
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Access token expiry is out of range"))?;

        let claims = Claims {
            login: login.to_string(),
            roles: roles.to_vec(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }
}
