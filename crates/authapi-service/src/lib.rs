//! # authapi-service
//!
//! The authorization service: registration, login, role assignment, and
//! per-user bucket operations. Collaborators (users repository, file
//! storage, credential hasher, token issuer) are injected at construction
//! time as `Arc` references so they can be swapped for in-memory doubles.
//!
//! Every operation takes the caller's [`RequestContext`] and races each
//! collaborator call against its cancellation token and deadline.
//!
//! [`RequestContext`]: authapi_core::types::RequestContext

pub mod account;
pub mod files;
pub mod pipeline;
pub mod roles;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use roles::{AddRolesOutcome, RoleStatus, RoleStatuses};
pub use service::AuthorizationService;
