//! Collaborator traits defined in `authapi-core` and implemented by other
//! crates.

pub mod hasher;
pub mod repository;
pub mod storage;

pub use hasher::CredentialHasher;
pub use repository::UsersRepository;
pub use storage::{FileStorage, ObjectMeta, StoredObject};
