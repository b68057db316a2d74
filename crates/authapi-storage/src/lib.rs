//! # authapi-storage
//!
//! [`FileStorage`] backends for per-account buckets: the local filesystem,
//! process memory, and (with the `s3` feature) S3-compatible object stores
//! such as MinIO.
//!
//! [`FileStorage`]: authapi_core::traits::FileStorage

pub mod factory;
pub mod providers;

pub use factory::build_storage;
pub use providers::{InMemoryFileStorage, LocalFileStorage};
#[cfg(feature = "s3")]
pub use providers::S3FileStorage;
