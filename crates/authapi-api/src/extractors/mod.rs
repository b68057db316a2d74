//! Custom Axum extractors.

pub mod auth;
pub mod context;
pub mod json;

pub use auth::AuthorizationHeader;
pub use context::RequestCtx;
pub use json::ValidatedJson;
