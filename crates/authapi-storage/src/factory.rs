//! Backend selection from configuration.

use std::sync::Arc;

use tracing::info;

use authapi_core::config::{StorageBackend, StorageConfig};
use authapi_core::result::AppResult;
use authapi_core::traits::FileStorage;

use crate::providers::{InMemoryFileStorage, LocalFileStorage};

/// Build the configured [`FileStorage`] backend.
///
/// Selecting `s3` in a build without the `s3` feature is a configuration
/// error.
pub async fn build_storage(config: &StorageConfig) -> AppResult<Arc<dyn FileStorage>> {
    let storage: Arc<dyn FileStorage> = match config.backend {
        StorageBackend::Local => Arc::new(LocalFileStorage::new(&config.local.root_path).await?),
        StorageBackend::Memory => Arc::new(InMemoryFileStorage::new()),
        StorageBackend::S3 => s3_backend(config).await?,
    };
    info!(backend = storage.backend_type(), "Storage backend ready");
    Ok(storage)
}

#[cfg(feature = "s3")]
async fn s3_backend(config: &StorageConfig) -> AppResult<Arc<dyn FileStorage>> {
    Ok(Arc::new(crate::providers::S3FileStorage::new(&config.s3).await?))
}

#[cfg(not(feature = "s3"))]
async fn s3_backend(_config: &StorageConfig) -> AppResult<Arc<dyn FileStorage>> {
    Err(authapi_core::error::AppError::configuration(
        "storage.backend = \"s3\" requires building with the `s3` feature",
    ))
}
