//! # authapi-database
//!
//! PostgreSQL connection management and the concrete [`UsersRepository`]
//! implementations: one backed by PostgreSQL and one held in memory.
//!
//! [`UsersRepository`]: authapi_core::traits::UsersRepository

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{InMemoryUsersRepository, PgUsersRepository};
