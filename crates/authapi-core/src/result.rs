//! Convenience result type alias for AuthAPI.

use crate::error::AppError;

/// A specialized `Result` type for AuthAPI operations.
pub type AppResult<T> = Result<T, AppError>;
