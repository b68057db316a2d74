//! In-memory storage backend.
//!
//! Buckets live in a [`DashMap`] keyed by bucket name. Downloads still land
//! on the local filesystem, with the same create-new semantics as the local
//! backend. The backend counts writes so tests can assert that a rejected
//! upload never reached storage.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use authapi_core::error::AppError;
use authapi_core::result::AppResult;
use authapi_core::traits::{FileStorage, ObjectMeta, StoredObject};
use authapi_core::types::RequestContext;

use super::check_segment;
use super::local::write_new_file;

type Bucket = BTreeMap<String, StoredObject>;

/// Storage backend held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    buckets: DashMap<String, Bucket>,
    writes: AtomicUsize,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put_object` calls that reached the backend.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    fn missing_bucket(bucket: &str) -> AppError {
        AppError::not_found(format!("Bucket not found: {bucket}"))
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn create_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        check_segment("bucket", bucket)?;
        match self.buckets.entry(bucket.to_string()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Bucket already exists: {bucket}"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Bucket::new());
                debug!(bucket, "Created bucket");
                Ok(())
            }
        }
    }

    async fn remove_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let removed = self
            .buckets
            .remove_if(bucket, |_, objects| objects.is_empty());
        if removed.is_some() {
            return Ok(());
        }
        if self.buckets.contains_key(bucket) {
            Err(AppError::storage(format!("Bucket is not empty: {bucket}")))
        } else {
            Err(Self::missing_bucket(bucket))
        }
    }

    async fn remove_all_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let mut objects = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        objects.clear();
        Ok(())
    }

    async fn put_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
        content: Bytes,
        size: u64,
        content_type: &str,
    ) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        check_segment("object", name)?;
        if content.len() as u64 != size {
            return Err(AppError::validation(format!(
                "Declared size {size} does not match content length {}",
                content.len()
            )));
        }

        let mut objects = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        if objects.contains_key(name) {
            return Err(AppError::conflict(format!("Object already exists: {name}")));
        }

        let meta = ObjectMeta {
            name: name.to_string(),
            size_bytes: size,
            content_type: (!content_type.is_empty()).then(|| content_type.to_string()),
            last_modified: Some(Utc::now()),
        };
        objects.insert(
            name.to_string(),
            StoredObject {
                meta,
                data: content,
            },
        );
        Ok(())
    }

    async fn get_object_meta(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<Option<ObjectMeta>> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        Ok(objects.get(name).map(|o| o.meta.clone()))
    }

    async fn delete_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<()> {
        let mut objects = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        objects.remove(name);
        Ok(())
    }

    async fn fetch_object_to_path(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
        dest: &Path,
    ) -> AppResult<()> {
        let object = self.read_object(ctx, bucket, name).await?;
        let mut reader: &[u8] = &object.data;
        write_new_file(dest, &mut reader).await
    }

    async fn list_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<Vec<String>> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        Ok(objects.keys().cloned().collect())
    }

    async fn read_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<StoredObject> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        objects
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {name}")))
    }
}
