//! Bucket object handlers.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use authapi_core::error::AppError;

use crate::dto::request::{DownloadFileRequest, FileRequest, LoginTargetRequest};
use crate::dto::response::{DONE, FileListResponse};
use crate::error::ApiError;
use crate::extractors::{AuthorizationHeader, RequestCtx, ValidatedJson};
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /user/uploadFile: multipart with a `login` text field and a `file` part
///
/// The token must be present and signed before any part is read. The full
/// check against `login` runs before the file bytes are buffered when the
/// `login` part comes first, and after the body otherwise.
pub async fn upload_file(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    mut multipart: Multipart,
) -> Result<Json<&'static str>, ApiError> {
    state.guard.authenticate(authorization.as_deref())?;

    let mut login: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "login" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                login = Some(text);
            }
            "file" => {
                if let Some(login) = login.as_deref().filter(|l| !l.is_empty()) {
                    state.guard.verify_token(authorization.as_deref(), login)?;
                }
                file_name = field.file_name().map(String::from);
                content_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let login = login
        .filter(|l| !l.is_empty())
        .ok_or_else(|| AppError::validation("login is required"))?;
    state.guard.verify_token(authorization.as_deref(), &login)?;

    let file_name = file_name.ok_or_else(|| AppError::validation("file is required"))?;
    let data = data.ok_or_else(|| AppError::validation("file data is required"))?;
    let content_type = content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let size = data.len() as u64;

    state
        .service
        .upload_file(&ctx, &login, &file_name, data, size, &content_type)
        .await?;
    Ok(Json(DONE))
}

/// POST /user/downloadFile: copies the object into `path` on the server
pub async fn download_file(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<DownloadFileRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    state
        .service
        .download_file(&ctx, &req.login, &req.file_name, &req.path)
        .await?;
    Ok(Json(DONE))
}

/// POST /user/getFile: streams the object back as the response body
pub async fn get_file(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<FileRequest>,
) -> Result<Response, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    let object = state
        .service
        .read_file(&ctx, &req.login, &req.file_name)
        .await?;

    let content_type = object
        .meta
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        req.file_name.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        object.data,
    )
        .into_response())
}

/// DELETE /user/deleteFile
pub async fn delete_file(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<FileRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    state
        .service
        .delete_file(&ctx, &req.login, &req.file_name)
        .await?;
    Ok(Json(DONE))
}

/// POST /user/getFileList
pub async fn get_file_list(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<LoginTargetRequest>,
) -> Result<Json<FileListResponse>, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    let files_list = state.service.get_file_list(&ctx, &req.login).await?;
    Ok(Json(FileListResponse { files_list }))
}
