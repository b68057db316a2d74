//! Local filesystem storage backend.
//!
//! Each bucket is a directory under the configured root and each object a
//! regular file inside it. Writes use create-new semantics so an existing
//! object or download destination is never overwritten.
//!
//! The content type given at upload is kept in a sidecar file under
//! `<root>/.meta/<bucket>/<object>`. Objects without a sidecar report a
//! type guessed from their extension.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use authapi_core::error::{AppError, ErrorKind};
use authapi_core::result::AppResult;
use authapi_core::traits::{FileStorage, ObjectMeta, StoredObject};
use authapi_core::types::RequestContext;

use super::check_segment;

/// Directory under the root holding per-object metadata sidecars. Reserved
/// as a bucket name.
const META_DIR: &str = ".meta";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Directory holding one subdirectory per bucket.
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a backend rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn bucket_path(&self, bucket: &str) -> AppResult<PathBuf> {
        check_segment("bucket", bucket)?;
        if bucket == META_DIR {
            return Err(AppError::validation(format!(
                "Invalid bucket name: '{bucket}'"
            )));
        }
        Ok(self.root.join(bucket))
    }

    fn meta_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(META_DIR).join(bucket)
    }

    /// Sidecar holding the content type of `name`. Both segments must
    /// already be checked.
    fn meta_path(&self, bucket: &str, name: &str) -> PathBuf {
        self.meta_dir(bucket).join(name)
    }

    async fn write_content_type(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
    ) -> std::io::Result<()> {
        fs::create_dir_all(self.meta_dir(bucket)).await?;
        fs::write(self.meta_path(bucket, name), content_type).await
    }

    /// Drop every sidecar of a bucket.
    async fn clear_meta_dir(&self, bucket: &str) -> AppResult<()> {
        ignore_missing(fs::remove_dir_all(self.meta_dir(bucket)).await)
            .map_err(|e| io_error(format!("Failed to remove metadata of bucket: {bucket}"), e))
    }

    /// Path of an object inside an existing bucket.
    async fn object_path(&self, bucket: &str, name: &str) -> AppResult<PathBuf> {
        let dir = self.existing_bucket(bucket).await?;
        check_segment("object", name)?;
        Ok(dir.join(name))
    }

    async fn existing_bucket(&self, bucket: &str) -> AppResult<PathBuf> {
        let dir = self.bucket_path(bucket)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(AppError::not_found(format!("Bucket not found: {bucket}"))),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                Err(AppError::not_found(format!("Bucket not found: {bucket}")))
            }
            Err(e) => Err(io_error(format!("Failed to stat bucket: {bucket}"), e)),
        }
    }

    async fn object_meta(&self, bucket: &str, name: &str) -> AppResult<Option<ObjectMeta>> {
        let path = self.object_path(bucket, name).await?;
        let meta = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(format!("Failed to stat object: {name}"), e)),
        };

        let content_type = match fs::read_to_string(self.meta_path(bucket, name)).await {
            Ok(stored) if !stored.is_empty() => stored,
            Ok(_) => guess_content_type(name),
            Err(e) if e.kind() == IoErrorKind::NotFound => guess_content_type(name),
            Err(e) => return Err(io_error(format!("Failed to read metadata: {name}"), e)),
        };

        Ok(Some(ObjectMeta {
            name: name.to_string(),
            size_bytes: meta.len(),
            content_type: Some(content_type),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        }))
    }
}

fn io_error(message: String, source: std::io::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, message, source)
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string()
}

fn ignore_missing(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn create_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let dir = self.bucket_path(bucket)?;
        fs::create_dir(&dir).await.map_err(|e| {
            if e.kind() == IoErrorKind::AlreadyExists {
                AppError::conflict(format!("Bucket already exists: {bucket}"))
            } else {
                io_error(format!("Failed to create bucket: {bucket}"), e)
            }
        })?;
        debug!(bucket, "Created bucket");
        Ok(())
    }

    async fn remove_bucket(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let dir = self.existing_bucket(bucket).await?;
        fs::remove_dir(&dir)
            .await
            .map_err(|e| io_error(format!("Failed to remove bucket: {bucket}"), e))?;
        self.clear_meta_dir(bucket).await?;
        debug!(bucket, "Removed bucket");
        Ok(())
    }

    async fn remove_all_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        let dir = self.existing_bucket(bucket).await?;
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| io_error(format!("Failed to list bucket: {bucket}"), e))?;

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(format!("Failed to read bucket entry: {bucket}"), e))?
        {
            fs::remove_file(entry.path()).await.map_err(|e| {
                io_error(
                    format!(
                        "Failed to remove object: {}",
                        entry.file_name().to_string_lossy()
                    ),
                    e,
                )
            })?;
            removed += 1;
        }
        self.clear_meta_dir(bucket).await?;
        debug!(bucket, removed, "Removed all objects");
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
        if content.len() as u64 != size {
            return Err(AppError::validation(format!(
                "Declared size {size} does not match content length {}",
                content.len()
            )));
        }
        let path = self.object_path(bucket, name).await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == IoErrorKind::AlreadyExists {
                    AppError::conflict(format!("Object already exists: {name}"))
                } else {
                    io_error(format!("Failed to create object: {name}"), e)
                }
            })?;

        let written = async {
            file.write_all(&content).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(bucket, name, error = %cleanup, "Failed to remove partial object");
            }
            return Err(io_error(format!("Failed to write object: {name}"), e));
        }

        if let Err(e) = self.write_content_type(bucket, name, content_type).await {
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(bucket, name, error = %cleanup, "Failed to remove object without metadata");
            }
            return Err(io_error(format!("Failed to write metadata: {name}"), e));
        }

        debug!(bucket, name, bytes = size, content_type, "Stored object");
        Ok(())
    }

    async fn get_object_meta(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<Option<ObjectMeta>> {
        self.object_meta(bucket, name).await
    }

    async fn delete_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<()> {
        let path = self.object_path(bucket, name).await?;
        ignore_missing(fs::remove_file(&path).await)
            .map_err(|e| io_error(format!("Failed to delete object: {name}"), e))?;
        ignore_missing(fs::remove_file(self.meta_path(bucket, name)).await)
            .map_err(|e| io_error(format!("Failed to delete metadata: {name}"), e))?;
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
        let path = self.object_path(bucket, name).await?;
        let mut source = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {name}"))
            } else {
                io_error(format!("Failed to open object: {name}"), e)
            }
        })?;

        write_new_file(dest, &mut source).await?;
        debug!(bucket, name, dest = %dest.display(), "Fetched object to local file");
        Ok(())
    }

    async fn list_objects(&self, _ctx: &RequestContext, bucket: &str) -> AppResult<Vec<String>> {
        let dir = self.existing_bucket(bucket).await?;
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| io_error(format!("Failed to list bucket: {bucket}"), e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(format!("Failed to read bucket entry: {bucket}"), e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_object(
        &self,
        _ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<StoredObject> {
        let path = self.object_path(bucket, name).await?;
        let meta = self
            .object_meta(bucket, name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Object not found: {name}")))?;

        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {name}"))
            } else {
                io_error(format!("Failed to read object: {name}"), e)
            }
        })?;

        Ok(StoredObject {
            meta,
            data: Bytes::from(data),
        })
    }
}

/// Copy `source` into a file at `dest` that must not exist yet. Missing
/// parent directories are created.
pub(crate) async fn write_new_file<R>(dest: &Path, source: &mut R) -> AppResult<()>
where
    R: tokio::io::AsyncRead + Unpin + ?Sized,
{
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            io_error(
                format!("Failed to create directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .await
        .map_err(|e| {
            if e.kind() == IoErrorKind::AlreadyExists {
                AppError::conflict(format!("Destination already exists: {}", dest.display()))
            } else {
                io_error(format!("Failed to create file: {}", dest.display()), e)
            }
        })?;

    let copied = async {
        tokio::io::copy(source, &mut file).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = copied {
        if let Err(cleanup) = fs::remove_file(dest).await {
            warn!(dest = %dest.display(), error = %cleanup, "Failed to remove partial file");
        }
        return Err(io_error(
            format!("Failed to write file: {}", dest.display()),
            e,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalFileStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalFileStorage::new(dir.path().join("buckets"))
            .await
            .expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_bucket_lifecycle() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();

        storage.create_bucket(&ctx, "alice-1").await.expect("create");
        let err = storage.create_bucket(&ctx, "alice-1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        storage
            .put_object(&ctx, "alice-1", "a.txt", Bytes::from("a"), 1, "text/plain")
            .await
            .expect("put");
        assert!(storage.remove_bucket(&ctx, "alice-1").await.is_err());

        storage
            .remove_all_objects(&ctx, "alice-1")
            .await
            .expect("clear");
        storage.remove_bucket(&ctx, "alice-1").await.expect("remove");
        let err = storage.list_objects(&ctx, "alice-1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!storage.meta_dir("alice-1").exists());
    }

    #[tokio::test]
    async fn test_content_type_survives_round_trip() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        storage
            .put_object(&ctx, "b", "photo.bin", Bytes::from("png"), 3, "image/png")
            .await
            .expect("put");

        let meta = storage
            .get_object_meta(&ctx, "b", "photo.bin")
            .await
            .expect("meta")
            .expect("exists");
        assert_eq!(meta.content_type.as_deref(), Some("image/png"));
        let object = storage.read_object(&ctx, "b", "photo.bin").await.expect("read");
        assert_eq!(object.meta.content_type.as_deref(), Some("image/png"));

        let names = storage.list_objects(&ctx, "b").await.expect("list");
        assert_eq!(names, vec!["photo.bin"]);

        storage
            .delete_object(&ctx, "b", "photo.bin")
            .await
            .expect("delete");
        storage
            .put_object(&ctx, "b", "photo.bin", Bytes::from("x"), 1, "")
            .await
            .expect("put again");
        let meta = storage
            .get_object_meta(&ctx, "b", "photo.bin")
            .await
            .expect("meta")
            .expect("exists");
        assert_eq!(
            meta.content_type.as_deref(),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_missing_sidecar_guesses_from_extension() {
        let (dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        std::fs::write(dir.path().join("buckets").join("b").join("notes.txt"), b"hi")
            .expect("write");

        let meta = storage
            .get_object_meta(&ctx, "b", "notes.txt")
            .await
            .expect("meta")
            .expect("exists");
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert!(storage.create_bucket(&ctx, ".meta").await.is_err());
    }

    #[tokio::test]
    async fn test_put_read_list_delete() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");

        for name in ["zeta.txt", "alpha.txt"] {
            storage
                .put_object(&ctx, "b", name, Bytes::from("hello"), 5, "text/plain")
                .await
                .expect("put");
        }

        let names = storage.list_objects(&ctx, "b").await.expect("list");
        assert_eq!(names, vec!["alpha.txt", "zeta.txt"]);

        let object = storage.read_object(&ctx, "b", "alpha.txt").await.expect("read");
        assert_eq!(object.data, Bytes::from("hello"));
        assert_eq!(object.meta.size_bytes, 5);
        assert_eq!(object.meta.content_type.as_deref(), Some("text/plain"));

        storage
            .delete_object(&ctx, "b", "alpha.txt")
            .await
            .expect("delete");
        let meta = storage
            .get_object_meta(&ctx, "b", "alpha.txt")
            .await
            .expect("meta");
        assert!(meta.is_none());
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        storage
            .put_object(&ctx, "b", "a.txt", Bytes::from("one"), 3, "text/plain")
            .await
            .expect("put");

        let err = storage
            .put_object(&ctx, "b", "a.txt", Bytes::from("two"), 3, "text/plain")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let object = storage.read_object(&ctx, "b", "a.txt").await.expect("read");
        assert_eq!(object.data, Bytes::from("one"));
    }

    #[tokio::test]
    async fn test_size_mismatch_rejected() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        let err = storage
            .put_object(&ctx, "b", "a.txt", Bytes::from("abc"), 10, "text/plain")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_fetch_to_path_create_new() {
        let (dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        storage
            .put_object(&ctx, "b", "a.txt", Bytes::from("data"), 4, "text/plain")
            .await
            .expect("put");

        let dest = dir.path().join("downloads").join("a.txt");
        storage
            .fetch_object_to_path(&ctx, "b", "a.txt", &dest)
            .await
            .expect("fetch");
        assert_eq!(std::fs::read(&dest).expect("read dest"), b"data");

        let err = storage
            .fetch_object_to_path(&ctx, "b", "a.txt", &dest)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = storage
            .fetch_object_to_path(&ctx, "b", "missing.txt", &dir.path().join("m.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_traversal_names_rejected() {
        let (_dir, storage) = storage().await;
        let ctx = RequestContext::new();
        storage.create_bucket(&ctx, "b").await.expect("create");
        let err = storage
            .put_object(&ctx, "b", "../escape", Bytes::from("x"), 1, "text/plain")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(storage.create_bucket(&ctx, "..").await.is_err());
    }
}
