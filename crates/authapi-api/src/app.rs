//! Application builder: wires router, middleware, and state into an Axum app.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;

use authapi_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the application until `shutdown` resolves.
///
/// On shutdown the state's cancellation token is cancelled so in-flight
/// collaborator calls stop, then open connections drain for at most
/// `server.shutdown_grace_seconds`.
pub async fn run_server<F>(state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let cancel = state.shutdown.clone();
    let drained = state.shutdown.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "AuthAPI server listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received, draining connections");
            cancel.cancel();
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            drained.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, closing remaining connections");
        }
    }

    Ok(())
}
