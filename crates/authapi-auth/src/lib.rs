//! # authapi-auth
//!
//! Token handling and credential primitives for AuthAPI.
//!
//! ## Modules
//!
//! - `jwt`: signed, time-limited claims carrying login + roles
//! - `guard`: request-time token and admin checks
//! - `password`: Argon2id password hashing and policy enforcement

pub mod guard;
pub mod jwt;
pub mod password;

pub use guard::{AccessGuard, bearer_token};
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
