//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authapi_core::types::Account;
use authapi_service::RoleStatuses;

/// Body returned by operations that have nothing else to report.
pub const DONE: &str = "Done";

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-role outcome of a successful `addRoles`.
#[derive(Debug, Clone, Serialize)]
pub struct AddRolesResponse {
    pub login: String,
    #[serde(rename = "roles status")]
    pub roles_status: RoleStatuses,
}

/// `addRoles` stopped by a failed assignment; statuses cover the roles
/// processed before the failure.
#[derive(Debug, Clone, Serialize)]
pub struct AddRolesErrorResponse {
    pub error: String,
    #[serde(rename = "roles status")]
    pub roles_status: RoleStatuses,
}

/// Account data without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserDataResponse {
    pub user: Account,
}

/// Object names in a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(rename = "files list")]
    pub files_list: Vec<String>,
}

/// Liveness check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
