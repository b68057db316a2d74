//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use authapi_auth::AccessGuard;
use authapi_core::config::AppConfig;
use authapi_service::AuthorizationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Accounts, roles, and per-user buckets
    pub service: Arc<AuthorizationService>,
    /// Bearer token checks
    pub guard: Arc<AccessGuard>,
    /// Cancelled on server shutdown; every request context is a child.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        service: Arc<AuthorizationService>,
        guard: Arc<AccessGuard>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            service,
            guard,
            shutdown,
        }
    }
}
