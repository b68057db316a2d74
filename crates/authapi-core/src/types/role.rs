//! Role names and their canonical form.
//!
//! Role names are compared and looked up only in canonical Title-case:
//! the first character upper-cased, every following character
//! lower-cased. The transformation is ASCII-only; letters outside ASCII
//! are kept as written, so the rule does not generalize to scripts with
//! their own casing (e.g. `"éditeur"` stays `"éditeur"`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title-case a raw role name (`"aDMIN"` becomes `"Admin"`).
pub fn canonical_role_name(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(raw.len());
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
            out
        }
        None => String::new(),
    }
}

/// A role name in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Role every account receives at registration.
    pub const USER: &'static str = "User";
    /// Role that grants access to every account.
    pub const ADMIN: &'static str = "Admin";

    /// Canonicalize and wrap a raw role name.
    pub fn new(raw: &str) -> Self {
        Self(canonical_role_name(raw))
    }

    /// The default role.
    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    /// The administrator role.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RoleName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for RoleName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<RoleName> for String {
    fn from(name: RoleName) -> String {
        name.0
    }
}

impl PartialEq<str> for RoleName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RoleName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
