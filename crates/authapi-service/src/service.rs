//! Authorization service construction and shared lookups.

use std::sync::Arc;

use authapi_auth::{JwtEncoder, PasswordValidator};
use authapi_core::config::{AuthConfig, StorageConfig};
use authapi_core::error::AppError;
use authapi_core::result::AppResult;
use authapi_core::traits::{CredentialHasher, FileStorage, UsersRepository};
use authapi_core::types::{Account, RequestContext};

/// Orchestrates accounts, roles, and per-user storage.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    /// Accounts, role catalog, and assignments.
    pub(crate) repo: Arc<dyn UsersRepository>,
    /// Bucket and object storage.
    pub(crate) storage: Arc<dyn FileStorage>,
    /// Password hash + verify.
    pub(crate) hasher: Arc<dyn CredentialHasher>,
    /// Token issuer.
    pub(crate) encoder: Arc<JwtEncoder>,
    /// Login and password policy.
    pub(crate) validator: PasswordValidator,
    /// Upload limits and allowed content types.
    pub(crate) storage_config: StorageConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        storage: Arc<dyn FileStorage>,
        hasher: Arc<dyn CredentialHasher>,
        encoder: Arc<JwtEncoder>,
        auth_config: &AuthConfig,
        storage_config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            storage,
            hasher,
            encoder,
            validator: PasswordValidator::new(auth_config),
            storage_config,
        }
    }

    /// Look up an account, failing with `UnexistingLogin` when it is absent.
    pub(crate) async fn require_account(
        &self,
        ctx: &RequestContext,
        login: &str,
    ) -> AppResult<Account> {
        ctx.run(self.repo.get_by_login(ctx, login))
            .await?
            .ok_or_else(AppError::unexisting_login)
    }
}
