//! Registration, login, unregistration, and account lookup.

use std::sync::Arc;

use tracing::{info, warn};

use authapi_auth::IssuedToken;
use authapi_core::error::{AppError, ErrorKind};
use authapi_core::result::AppResult;
use authapi_core::traits::CredentialHasher;
use authapi_core::types::{Account, RequestContext, RoleName};

use crate::pipeline::{Step, run_step};
use crate::service::AuthorizationService;

impl AuthorizationService {
    /// Register a new account.
    ///
    /// Pipeline: create account, assign `User`, create the bucket. A login
    /// that exists at lookup time or is rejected by the repository's
    /// uniqueness check fails with `ExistingLogin`.
    pub async fn register_user(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
    ) -> AppResult<Account> {
        self.validator.validate_login(login)?;
        self.validator.validate(password)?;

        if ctx.run(self.repo.get_by_login(ctx, login)).await?.is_some() {
            return Err(AppError::existing_login());
        }

        let password_hash = hash_blocking(&self.hasher, password).await?;

        let mut account = run_step(ctx, login, Step::CreateAccount, async {
            self.repo
                .create(ctx, login, &password_hash)
                .await
                .map_err(|e| {
                    if e.is(ErrorKind::Conflict) {
                        AppError::existing_login()
                    } else {
                        e
                    }
                })
        })
        .await?;

        run_step(ctx, login, Step::AssignDefaultRole, async {
            let role = RoleName::user();
            let role_id = self
                .repo
                .get_role_id(ctx, &role)
                .await?
                .ok_or_else(|| AppError::configuration("role catalog has no 'User' role"))?;
            self.repo.assign_role(ctx, account.id, role_id).await?;
            account.roles.push(role);
            Ok(())
        })
        .await?;

        let bucket = account.bucket_name();
        run_step(
            ctx,
            login,
            Step::CreateBucket,
            self.storage.create_bucket(ctx, &bucket),
        )
        .await?;

        info!(account_id = %account.id, login = %login, bucket = %bucket, "User registered");
        Ok(account)
    }

    /// Check credentials and issue an access token carrying the account's
    /// current roles.
    pub async fn login_user(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
    ) -> AppResult<IssuedToken> {
        let account = self.require_account(ctx, login).await?;

        let matches = verify_blocking(&self.hasher, password, &account.password_hash).await?;
        if !matches {
            warn!(login = %login, "Login rejected: incorrect password");
            return Err(AppError::incorrect_password());
        }

        let token = self.encoder.issue(&account.login, &account.roles)?;
        info!(login = %login, expires_at = %token.expires_at, "User logged in");
        Ok(token)
    }

    /// Remove an account together with its bucket and every object in it.
    ///
    /// Pipeline: remove objects, remove bucket, delete account. The caller
    /// must already have passed the access guard for `login`.
    pub async fn unregister_user(&self, ctx: &RequestContext, login: &str) -> AppResult<()> {
        let account = self.require_account(ctx, login).await?;
        let bucket = account.bucket_name();

        let cleared = run_step(ctx, login, Step::RemoveObjects, async {
            match self.storage.remove_all_objects(ctx, &bucket).await {
                Ok(()) => Ok(true),
                Err(e) if e.is(ErrorKind::NotFound) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await?;

        if cleared {
            run_step(
                ctx,
                login,
                Step::RemoveBucket,
                self.storage.remove_bucket(ctx, &bucket),
            )
            .await?;
        } else {
            warn!(login = %login, bucket = %bucket, "Bucket already gone, removing account only");
        }

        let deleted = run_step(
            ctx,
            login,
            Step::DeleteAccount,
            self.repo.delete(ctx, login),
        )
        .await?;
        if !deleted {
            return Err(AppError::unexisting_login());
        }

        info!(account_id = %account.id, login = %login, "User unregistered");
        Ok(())
    }

    /// Fetch an account with its roles.
    pub async fn get_user_data(&self, ctx: &RequestContext, login: &str) -> AppResult<Account> {
        self.require_account(ctx, login).await
    }

    /// Create the account's bucket.
    pub async fn create_bucket(&self, ctx: &RequestContext, login: &str) -> AppResult<()> {
        let account = self.require_account(ctx, login).await?;
        ctx.run(self.storage.create_bucket(ctx, &account.bucket_name()))
            .await
    }

    /// Remove the account's (empty) bucket.
    pub async fn remove_bucket(&self, ctx: &RequestContext, login: &str) -> AppResult<()> {
        let account = self.require_account(ctx, login).await?;
        ctx.run(self.storage.remove_bucket(ctx, &account.bucket_name()))
            .await
    }
}

/// Run the hasher on the blocking pool.
async fn hash_blocking(hasher: &Arc<dyn CredentialHasher>, password: &str) -> AppResult<String> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
}

async fn verify_blocking(
    hasher: &Arc<dyn CredentialHasher>,
    password: &str,
    hash: &str,
) -> AppResult<bool> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
}
