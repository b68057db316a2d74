//! Per-user bucket object operations.
//!
//! Every operation resolves the account first (`UnexistingLogin` when it is
//! missing) and addresses the bucket `lowercase(login)-accountId`.
//! Existence pre-checks give the named errors; a conflict reported by the
//! storage write itself maps to the same named error.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::info;

use authapi_core::error::{AppError, ErrorKind};
use authapi_core::result::AppResult;
use authapi_core::traits::StoredObject;
use authapi_core::types::RequestContext;

use crate::service::AuthorizationService;

/// Object names are single path segments.
fn validate_file_name(name: &str) -> AppResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(AppError::validation(format!("invalid file name: '{name}'")));
    }
    Ok(())
}

impl AuthorizationService {
    /// Store a new object in the user's bucket.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        login: &str,
        file_name: &str,
        content: Bytes,
        size: u64,
        content_type: &str,
    ) -> AppResult<()> {
        let account = self.require_account(ctx, login).await?;
        validate_file_name(file_name)?;

        if !self.storage_config.is_content_type_allowed(content_type) {
            return Err(AppError::type_not_allowed());
        }
        if size > self.storage_config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "file exceeds the upload limit of {} bytes",
                self.storage_config.max_upload_size_bytes
            )));
        }

        let bucket = account.bucket_name();
        if ctx
            .run(self.storage.get_object_meta(ctx, &bucket, file_name))
            .await?
            .is_some()
        {
            return Err(AppError::existing_file());
        }

        ctx.run(
            self.storage
                .put_object(ctx, &bucket, file_name, content, size, content_type),
        )
        .await
        .map_err(|e| conflict_as(e, AppError::existing_file))?;

        info!(login = %login, bucket = %bucket, file = %file_name, size, "File uploaded");
        Ok(())
    }

    /// Copy an object to `destination_dir/file_name` on the server's
    /// filesystem. An existing destination file is never overwritten.
    pub async fn download_file(
        &self,
        ctx: &RequestContext,
        login: &str,
        file_name: &str,
        destination_dir: &str,
    ) -> AppResult<PathBuf> {
        let account = self.require_account(ctx, login).await?;
        validate_file_name(file_name)?;
        let bucket = account.bucket_name();

        if ctx
            .run(self.storage.get_object_meta(ctx, &bucket, file_name))
            .await?
            .is_none()
        {
            return Err(AppError::unexisting_file());
        }

        let dest = Path::new(destination_dir).join(file_name);
        let exists = tokio::fs::try_exists(&dest).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to check destination: {}", dest.display()),
                e,
            )
        })?;
        if exists {
            return Err(AppError::existing_file());
        }

        ctx.run(
            self.storage
                .fetch_object_to_path(ctx, &bucket, file_name, &dest),
        )
        .await
        .map_err(|e| match e.kind {
            ErrorKind::Conflict => AppError::existing_file(),
            ErrorKind::NotFound => AppError::unexisting_file(),
            _ => e,
        })?;

        info!(login = %login, file = %file_name, dest = %dest.display(), "File downloaded");
        Ok(dest)
    }

    /// Read an object into memory for streaming back to the caller.
    pub async fn read_file(
        &self,
        ctx: &RequestContext,
        login: &str,
        file_name: &str,
    ) -> AppResult<StoredObject> {
        let account = self.require_account(ctx, login).await?;
        validate_file_name(file_name)?;

        ctx.run(
            self.storage
                .read_object(ctx, &account.bucket_name(), file_name),
        )
        .await
        .map_err(|e| {
            if e.is(ErrorKind::NotFound) {
                AppError::unexisting_file()
            } else {
                e
            }
        })
    }

    /// Delete an object from the user's bucket.
    pub async fn delete_file(
        &self,
        ctx: &RequestContext,
        login: &str,
        file_name: &str,
    ) -> AppResult<()> {
        let account = self.require_account(ctx, login).await?;
        validate_file_name(file_name)?;
        let bucket = account.bucket_name();

        if ctx
            .run(self.storage.get_object_meta(ctx, &bucket, file_name))
            .await?
            .is_none()
        {
            return Err(AppError::unexisting_file());
        }

        ctx.run(self.storage.delete_object(ctx, &bucket, file_name))
            .await?;

        info!(login = %login, bucket = %bucket, file = %file_name, "File deleted");
        Ok(())
    }

    /// Names of every object in the user's bucket, sorted.
    pub async fn get_file_list(&self, ctx: &RequestContext, login: &str) -> AppResult<Vec<String>> {
        let account = self.require_account(ctx, login).await?;
        ctx.run(self.storage.list_objects(ctx, &account.bucket_name()))
            .await
    }
}

fn conflict_as(err: AppError, named: fn() -> AppError) -> AppError {
    if err.is(ErrorKind::Conflict) {
        named()
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use authapi_core::config::StorageConfig;

    async fn upload(fx: &Fixture, name: &str, body: &'static [u8]) -> AppResult<()> {
        fx.service
            .upload_file(
                &fx.ctx,
                "alice",
                name,
                Bytes::from_static(body),
                body.len() as u64,
                "text/plain",
            )
            .await
    }

    #[tokio::test]
    async fn test_upload_list_read_delete() {
        let fx = Fixture::new();
        fx.register("alice", "pw1").await;

        upload(&fx, "b.txt", b"bee").await.expect("upload");
        upload(&fx, "a.txt", b"ay").await.expect("upload");

        let names = fx.service.get_file_list(&fx.ctx, "alice").await.expect("list");
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        let object = fx
            .service
            .read_file(&fx.ctx, "alice", "b.txt")
            .await
            .expect("read");
        assert_eq!(object.data, Bytes::from_static(b"bee"));
        assert_eq!(object.meta.content_type.as_deref(), Some("text/plain"));

        fx.service
            .delete_file(&fx.ctx, "alice", "b.txt")
            .await
            .expect("delete");
        let err = fx
            .service
            .delete_file(&fx.ctx, "alice", "b.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexistingFile);
        let err = fx
            .service
            .read_file(&fx.ctx, "alice", "b.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexistingFile);
    }

    #[tokio::test]
    async fn test_duplicate_upload_skips_storage_write() {
        let fx = Fixture::new();
        fx.register("alice", "pw1").await;
        upload(&fx, "a.txt", b"one").await.expect("upload");
        let writes = fx.storage.write_count();

        let err = upload(&fx, "a.txt", b"two").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExistingFile);
        assert_eq!(fx.storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_upload_conflict_at_write_is_existing_file() {
        let fx = Fixture::new();
        fx.register("alice", "pw1").await;
        upload(&fx, "a.txt", b"one").await.expect("upload");
        fx.stale.hide_objects();
        let writes = fx.storage.write_count();

        let err = upload(&fx, "a.txt", b"two").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExistingFile);
        assert_eq!(fx.storage.write_count(), writes + 1);

        let object = fx
            .service
            .read_file(&fx.ctx, "alice", "a.txt")
            .await
            .expect("read");
        assert_eq!(object.data, Bytes::from_static(b"one"));
    }

    #[tokio::test]
    async fn test_upload_type_allow_list() {
        let fx = Fixture::with_storage_config(StorageConfig {
            allowed_content_types: vec!["image/png".to_string()],
            ..StorageConfig::default()
        });
        fx.register("alice", "pw1").await;

        let err = upload(&fx, "a.txt", b"text").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeNotAllowed);
        assert_eq!(fx.storage.write_count(), 0);

        fx.service
            .upload_file(
                &fx.ctx,
                "alice",
                "a.png",
                Bytes::from_static(b"png"),
                3,
                "image/png",
            )
            .await
            .expect("allowed type");
    }

    #[tokio::test]
    async fn test_upload_size_limit() {
        let fx = Fixture::with_storage_config(StorageConfig {
            max_upload_size_bytes: 2,
            ..StorageConfig::default()
        });
        fx.register("alice", "pw1").await;
        let err = upload(&fx, "a.txt", b"abc").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let fx = Fixture::new();
        let err = upload(&fx, "a.txt", b"a").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexistingLogin);
        let err = fx
            .service
            .get_file_list(&fx.ctx, "alice")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexistingLogin);
    }

    #[tokio::test]
    async fn test_download_to_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest_dir = dir.path().to_string_lossy().into_owned();
        let fx = Fixture::new();
        fx.register("alice", "pw1").await;
        upload(&fx, "a.txt", b"data").await.expect("upload");

        let path = fx
            .service
            .download_file(&fx.ctx, "alice", "a.txt", &dest_dir)
            .await
            .expect("download");
        assert_eq!(path, dir.path().join("a.txt"));
        assert_eq!(std::fs::read(&path).expect("read"), b"data");

        let err = fx
            .service
            .download_file(&fx.ctx, "alice", "a.txt", &dest_dir)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExistingFile);

        let err = fx
            .service
            .download_file(&fx.ctx, "alice", "missing.txt", &dest_dir)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexistingFile);
    }

    #[tokio::test]
    async fn test_path_like_names_rejected() {
        let fx = Fixture::new();
        fx.register("alice", "pw1").await;
        let err = upload(&fx, "../x", b"a").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
