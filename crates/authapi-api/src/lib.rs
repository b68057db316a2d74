//! # authapi-api
//!
//! HTTP API layer for AuthAPI built on Axum.
//!
//! Provides the `/user` endpoints, request logging and CORS middleware,
//! extractors, DTOs, and the mapping from `AppError` to status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
