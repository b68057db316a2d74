//! Storage backend configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend holds user buckets.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Content types accepted for upload. Empty means every type is accepted.
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            max_upload_size_bytes: default_max_upload(),
            allowed_content_types: Vec::new(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Whether an upload with the given content type is accepted.
    ///
    /// Parameters after `;` (e.g. `charset=utf-8`) are ignored and the
    /// comparison is case-insensitive.
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One directory per bucket under `local.root_path`.
    #[default]
    Local,
    /// Process memory; contents are lost on restart.
    Memory,
    /// S3-compatible object store such as MinIO.
    S3,
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local bucket directories.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing (required by MinIO).
    #[serde(default = "default_true")]
    pub force_path_style: bool,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: true,
        }
    }
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}

fn default_local_root() -> String {
    "./data/buckets".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_accepts_everything() {
        let config = StorageConfig::default();
        assert!(config.is_content_type_allowed("application/x-anything"));
    }

    #[test]
    fn test_allow_list_ignores_parameters_and_case() {
        let config = StorageConfig {
            allowed_content_types: vec!["text/plain".to_string(), "image/png".to_string()],
            ..StorageConfig::default()
        };
        assert!(config.is_content_type_allowed("Text/Plain; charset=utf-8"));
        assert!(config.is_content_type_allowed("image/png"));
        assert!(!config.is_content_type_allowed("application/pdf"));
    }
}
