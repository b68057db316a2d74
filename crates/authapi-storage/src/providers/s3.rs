//! S3-compatible storage backend (requires the `s3` feature).
//!
//! Buckets map to S3 buckets one to one. Path-style addressing is used by
//! default so the backend works against MinIO.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use authapi_core::config::S3StorageConfig;
use authapi_core::error::AppError;
use authapi_core::result::AppResult;
use authapi_core::traits::{FileStorage, ObjectMeta, StoredObject};
use authapi_core::types::RequestContext;

use super::check_segment;
use super::local::write_new_file;

/// S3-compatible storage backend.
#[derive(Debug, Clone)]
pub struct S3FileStorage {
    client: Client,
}

impl S3FileStorage {
    /// Build a client from configuration. Static credentials are used when
    /// an access key is configured, otherwise the default AWS chain.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            path_style = config.force_path_style,
            "Initializing S3 storage backend"
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "authapi-config",
            ));
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }

    async fn object_names(&self, bucket: &str) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_bucket()) {
                    AppError::not_found(format!("Bucket not found: {bucket}"))
                } else {
                    s3_error(&format!("Failed to list bucket: {bucket}"), &e)
                }
            })?;
            names.extend(
                page.contents()
                    .iter()
                    .filter_map(|o| o.key().map(str::to_string)),
            );
        }

        names.sort();
        Ok(names)
    }
}

fn s3_error<E: std::error::Error>(message: &str, err: &E) -> AppError {
    AppError::storage(format!("{message}: {}", DisplayErrorContext(err)))
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[async_trait]
impl FileStorage for S3FileStorage {
    fn backend_type(&self) -> &str {
        "s3"
    }

    async fn create_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        check_segment("bucket", bucket)?;
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_bucket_already_owned_by_you() || s.is_bucket_already_exists() => {
                    AppError::conflict(format!("Bucket already exists: {bucket}"))
                }
                _ => s3_error(&format!("Failed to create bucket: {bucket}"), &e),
            })?;
        debug!(bucket, "Created bucket");
        Ok(())
    }

    async fn remove_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| s3_error(&format!("Failed to remove bucket: {bucket}"), &e))?;
        debug!(bucket, "Removed bucket");
        Ok(())
    }

    async fn remove_all_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let names = self.object_names(bucket).await?;
        for name in &names {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(name)
                .send()
                .await
                .map_err(|e| s3_error(&format!("Failed to remove object: {name}"), &e))?;
        }
        debug!(bucket, removed = names.len(), "Removed all objects");
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
        check_segment("object", name)?;
        if content.len() as u64 != size {
            return Err(AppError::validation(format!(
                "Declared size {size} does not match content length {}",
                content.len()
            )));
        }
        let length = i64::try_from(size)
            .map_err(|_| AppError::validation(format!("Object too large: {size} bytes")))?;

        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(name)
            .content_length(length)
            .if_none_match("*")
            .body(ByteStream::from(content));
        if !content_type.is_empty() {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| {
            let status = e.raw_response().map(|r| r.status().as_u16());
            if status == Some(412) {
                AppError::conflict(format!("Object already exists: {name}"))
            } else {
                s3_error(&format!("Failed to store object: {name}"), &e)
            }
        })?;

        debug!(bucket, name, bytes = size, "Stored object");
        Ok(())
    }

    async fn get_object_meta(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<Option<ObjectMeta>> {
        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(name)
            .send()
            .await;

        match head {
            Ok(out) => Ok(Some(ObjectMeta {
                name: name.to_string(),
                size_bytes: out.content_length().unwrap_or(0).max(0) as u64,
                content_type: out.content_type().map(str::to_string),
                last_modified: out.last_modified().and_then(to_chrono),
            })),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(None),
            Err(e) => Err(s3_error(&format!("Failed to stat object: {name}"), &e)),
        }
    }

    async fn delete_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| s3_error(&format!("Failed to delete object: {name}"), &e))?;
        debug!(bucket, name, "Deleted object");
        Ok(())
    }

    async fn fetch_object_to_path(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
        dest: &Path,
    ) -> AppResult<()> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_no_such_key() => {
                    AppError::not_found(format!("Object not found: {name}"))
                }
                _ => s3_error(&format!("Failed to fetch object: {name}"), &e),
            })?;

        let mut reader = Box::pin(out.body.into_async_read());
        write_new_file(dest, &mut reader).await?;
        debug!(bucket, name, dest = %dest.display(), "Fetched object to local file");
        Ok(())
    }

    async fn list_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<Vec<String>> {
        self.object_names(bucket).await
    }

    async fn read_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<StoredObject> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_no_such_key() => {
                    AppError::not_found(format!("Object not found: {name}"))
                }
                _ => s3_error(&format!("Failed to read object: {name}"), &e),
            })?;

        let meta = ObjectMeta {
            name: name.to_string(),
            size_bytes: out.content_length().unwrap_or(0).max(0) as u64,
            content_type: out.content_type().map(str::to_string),
            last_modified: out.last_modified().and_then(to_chrono),
        };
        let data = out
            .body
            .collect()
            .await
            .map_err(|e| s3_error(&format!("Failed to read object body: {name}"), &e))?
            .into_bytes();

        Ok(StoredObject { meta, data })
    }
}
