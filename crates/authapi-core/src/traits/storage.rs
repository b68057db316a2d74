//! Object storage contract for per-account buckets.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::RequestContext;

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// Object name within its bucket.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type recorded at upload (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
}

/// An object's metadata together with its content.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub data: Bytes,
}

/// Trait for bucket-oriented storage backends.
///
/// Implementations exist for the local filesystem, process memory, and
/// S3-compatible stores in `authapi-storage`.
#[async_trait]
pub trait FileStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "s3").
    fn backend_type(&self) -> &str;

    /// Create an empty bucket.
    async fn create_bucket(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()>;

    /// Remove an empty bucket.
    async fn remove_bucket(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()>;

    /// Remove every object in a bucket, leaving the bucket in place.
    async fn remove_all_objects(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()>;

    /// Store a new object.
    ///
    /// Backends that can detect an existing object at write time reject it
    /// with [`ErrorKind::Conflict`](crate::error::ErrorKind::Conflict).
    async fn put_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
        content: Bytes,
        size: u64,
        content_type: &str,
    ) -> AppResult<()>;

    /// Get metadata for an object, `None` if it does not exist.
    async fn get_object_meta(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<Option<ObjectMeta>>;

    /// Delete an object.
    async fn delete_object(&self, ctx: &RequestContext, bucket: &str, name: &str)
    -> AppResult<()>;

    /// Copy an object into a new local file at `dest`.
    ///
    /// An existing file at `dest` is never overwritten; it is reported as
    /// [`ErrorKind::Conflict`](crate::error::ErrorKind::Conflict).
    async fn fetch_object_to_path(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
        dest: &Path,
    ) -> AppResult<()>;

    /// List object names in a bucket, sorted by name.
    async fn list_objects(&self, ctx: &RequestContext, bucket: &str) -> AppResult<Vec<String>>;

    /// Read an object into memory.
    async fn read_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<StoredObject>;
}
