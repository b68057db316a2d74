//! AuthAPI server: account registration, JWT login, role assignment, and
//! per-user file buckets.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use authapi_api::{AppState, app::run_server};
use authapi_auth::{AccessGuard, JwtDecoder, JwtEncoder, PasswordHasher};
use authapi_core::config::{AppConfig, RepositoryBackend};
use authapi_core::error::AppError;
use authapi_core::traits::{CredentialHasher, UsersRepository};
use authapi_database::{DatabasePool, InMemoryUsersRepository};
use authapi_service::AuthorizationService;
use authapi_storage::build_storage;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `AUTHAPI_ENV` overlay, and `AUTHAPI__*`
/// environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("AUTHAPI_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AuthAPI v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Users repository ─────────────────────────────────
    let mut db_pool: Option<DatabasePool> = None;
    let repo: Arc<dyn UsersRepository> = match config.database.backend {
        RepositoryBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            tracing::info!("Running database migrations...");
            pool.migrate().await?;
            let repo: Arc<dyn UsersRepository> = Arc::new(pool.users_repository());
            db_pool = Some(pool);
            repo
        }
        RepositoryBackend::Memory => {
            tracing::warn!("Using in-memory users repository; accounts are lost on restart");
            Arc::new(InMemoryUsersRepository::seeded())
        }
    };

    // ── Step 2: File storage ─────────────────────────────────────
    let storage = build_storage(&config.storage).await?;
    tracing::info!(backend = storage.backend_type(), "Storage initialized");

    // ── Step 3: Auth ─────────────────────────────────────────────
    let hasher: Arc<dyn CredentialHasher> = Arc::new(PasswordHasher::new());
    let encoder = Arc::new(JwtEncoder::new(&config.auth)?);
    let decoder = Arc::new(JwtDecoder::new(&config.auth));
    let guard = Arc::new(AccessGuard::new(decoder, &config.auth));

    // ── Step 4: Service + HTTP ───────────────────────────────────
    let service = Arc::new(AuthorizationService::new(
        repo,
        storage,
        hasher,
        encoder,
        &config.auth,
        config.storage.clone(),
    ));

    let state = AppState::new(Arc::new(config), service, guard, CancellationToken::new());
    let result = run_server(state, shutdown_signal()).await;

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    tracing::info!("AuthAPI server stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
