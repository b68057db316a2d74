//! Core type definitions used across the AuthAPI workspace.

pub mod account;
pub mod context;
pub mod id;
pub mod role;

pub use account::{Account, bucket_name};
pub use context::RequestContext;
pub use id::*;
pub use role::{RoleName, canonical_role_name};
