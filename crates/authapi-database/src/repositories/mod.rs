//! Users repository implementations.

pub mod memory;
pub mod user;

pub use memory::InMemoryUsersRepository;
pub use user::PgUsersRepository;
