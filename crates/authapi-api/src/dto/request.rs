//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register and login body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Body naming only the target account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginTargetRequest {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
}

/// Role assignment body. `roles` is a whitespace-separated list of names.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddRolesRequest {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[serde(default)]
    pub roles: String,
}

/// Body addressing one object in the target account's bucket.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileRequest {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[serde(rename = "file-name")]
    #[validate(length(min = 1, message = "file-name is required"))]
    pub file_name: String,
}

/// Copy an object to a directory on the server's filesystem.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DownloadFileRequest {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[serde(rename = "file-name")]
    #[validate(length(min = 1, message = "file-name is required"))]
    pub file_name: String,
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}
