//! Account model.

use serde::{Deserialize, Serialize};

use super::id::AccountId;
use super::role::RoleName;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, assigned at creation.
    pub id: AccountId,
    /// Unique, case-sensitive login.
    pub login: String,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Assigned roles in assignment order.
    pub roles: Vec<RoleName>,
}

impl Account {
    /// Name of the storage bucket owned by this account.
    pub fn bucket_name(&self) -> String {
        bucket_name(&self.login, &self.id)
    }

    /// Whether `role` is among the assigned roles.
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }
}

/// Derive the bucket name for an account: `lowercase(login)-accountId`.
pub fn bucket_name(login: &str, id: &AccountId) -> String {
    format!("{}-{}", login.to_lowercase(), id)
}
