//! JWT signature validation.

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use authapi_core::config::AuthConfig;
use authapi_core::error::AppError;

use super::claims::Claims;

/// Validates JWT signatures and structure.
///
/// Expiry is deliberately not checked here: the access guard evaluates
/// permission before expiry, so the decoder only answers "is this a token
/// we signed".
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes a token and checks its signature.
    ///
    /// Any parse, structure, algorithm, or signature failure is reported as
    /// `InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AppError::invalid_token()
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use authapi_core::error::ErrorKind;
    use authapi_core::types::RoleName;
    use chrono::{Duration, Utc};

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issued_claims_decode() {
        let cfg = config("s3cret");
        let issued = JwtEncoder::new(&cfg)
            .expect("encoder")
            .issue("alice", &[RoleName::user()])
            .expect("issue");
        let claims = JwtDecoder::new(&cfg)
            .decode(&issued.access_token)
            .expect("decode");
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.roles, vec![RoleName::user()]);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issued = JwtEncoder::new(&config("one"))
            .expect("encoder")
            .issue("alice", &[RoleName::user()])
            .expect("issue");
        let err = JwtDecoder::new(&config("two"))
            .decode(&issued.access_token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let err = JwtDecoder::new(&config("s3cret"))
            .decode("not.a.jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let cfg = config("s3cret");
        let issued = JwtEncoder::new(&cfg)
            .expect("encoder")
            .issue_at("alice", &[RoleName::user()], Utc::now() - Duration::hours(3))
            .expect("issue");
        let claims = JwtDecoder::new(&cfg)
            .decode(&issued.access_token)
            .expect("signature is still valid");
        assert!(claims.is_expired_at(Utc::now(), 0));
    }
}
