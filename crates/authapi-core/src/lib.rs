//! # authapi-core
//!
//! Core crate for AuthAPI. Contains the collaborator traits
//! (`UsersRepository`, `FileStorage`), configuration schemas, typed
//! identifiers, domain models, request contexts, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other AuthAPI crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
