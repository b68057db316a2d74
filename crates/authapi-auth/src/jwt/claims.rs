//! JWT claims structure carried by access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authapi_core::config::AdminRoleMatch;
use authapi_core::types::RoleName;

/// JWT claims payload embedded in every access token.
///
/// Roles are a snapshot taken at login; they are not re-read from the
/// repository until the holder logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login of the account the token was issued to.
    pub login: String,
    /// Roles held at issuance, in assignment order.
    pub roles: Vec<RoleName>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Whether the token is past expiry at `now`, allowing `leeway_seconds`
    /// of clock skew. The token is still valid during the `exp` second.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        now.timestamp() > self.exp.saturating_add(leeway_seconds)
    }

    /// Whether the role snapshot grants admin rights under `mode`.
    pub fn is_admin(&self, mode: AdminRoleMatch) -> bool {
        match mode {
            AdminRoleMatch::First => self.roles.first().is_some_and(RoleName::is_admin),
            AdminRoleMatch::Any => self.roles.iter().any(RoleName::is_admin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: &[&str]) -> Claims {
        Claims {
            login: "alice".to_string(),
            roles: roles.iter().map(|r| RoleName::new(r)).collect(),
            iat: 1_000,
            exp: 4_600,
        }
    }

    #[test]
    fn test_first_role_mode_ignores_later_admin() {
        let c = claims(&["User", "Admin"]);
        assert!(!c.is_admin(AdminRoleMatch::First));
        assert!(c.is_admin(AdminRoleMatch::Any));
    }

    #[test]
    fn test_admin_first() {
        let c = claims(&["Admin", "User"]);
        assert!(c.is_admin(AdminRoleMatch::First));
        assert!(!claims(&[]).is_admin(AdminRoleMatch::First));
    }

    #[test]
    fn test_expiry_boundary() {
        let c = claims(&["User"]);
        let at = |secs| DateTime::from_timestamp(secs, 0).expect("timestamp");
        assert!(!c.is_expired_at(at(4_600), 0));
        assert!(c.is_expired_at(at(4_601), 0));
        assert!(!c.is_expired_at(at(4_601), 5));
    }
}
