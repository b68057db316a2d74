//! Route definitions for the AuthAPI HTTP surface.
//!
//! Account and bucket routes are mounted under `/user`; `/health` sits at
//! the root. The router receives `AppState` and passes it to all handlers
//! via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart boundaries and the `login` field on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .nest("/user", user_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Account and bucket endpoints.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::user::register))
        .route("/login", post(handlers::user::login))
        .route("/unregister", delete(handlers::user::unregister))
        .route("/addRoles", put(handlers::user::add_roles))
        .route("/getUserData", post(handlers::user::get_user_data))
        .route("/uploadFile", post(handlers::file::upload_file))
        .route("/downloadFile", post(handlers::file::download_file))
        .route("/getFile", post(handlers::file::get_file))
        .route("/deleteFile", delete(handlers::file::delete_file))
        .route("/getFileList", post(handlers::file::get_file_list))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
