//! PostgreSQL users repository.
//!
//! Schema (see `migrations/`): `profile` holds accounts, `role` the catalog,
//! and `profile_role` the assignments ordered by `assigned_at`.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use authapi_core::error::{AppError, ErrorKind};
use authapi_core::result::AppResult;
use authapi_core::traits::UsersRepository;
use authapi_core::types::{Account, AccountId, RequestContext, RoleId, RoleName};

/// Unique constraint on `profile.profile_login`.
const LOGIN_CONSTRAINT: &str = "profile_login_key";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    profile_id: Uuid,
    profile_login: String,
    profile_password: String,
}

/// [`UsersRepository`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn get_by_login(
        &self,
        ctx: &RequestContext,
        login: &str,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT profile_id, profile_login, profile_password FROM profile \
             WHERE profile_login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find profile", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roles = self.get_roles_of(ctx, login).await?;

        Ok(Some(Account {
            id: AccountId::from_uuid(row.profile_id),
            login: row.profile_login,
            password_hash: row.profile_password,
            roles,
        }))
    }

    async fn get_roles_of(&self, _ctx: &RequestContext, login: &str) -> AppResult<Vec<RoleName>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT r.role_name FROM profile p \
             INNER JOIN profile_role pr ON pr.profile_id = p.profile_id \
             INNER JOIN role r ON r.role_id = pr.role_id \
             WHERE p.profile_login = $1 \
             ORDER BY pr.assigned_at, r.role_name",
        )
        .bind(login)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list profile roles", e))?;

        Ok(names.into_iter().map(RoleName::from).collect())
    }

    async fn list_role_catalog(&self, _ctx: &RequestContext) -> AppResult<HashSet<RoleName>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT role_name FROM role")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        Ok(names.into_iter().map(RoleName::from).collect())
    }

    async fn get_role_id(
        &self,
        _ctx: &RequestContext,
        name: &RoleName,
    ) -> AppResult<Option<RoleId>> {
        sqlx::query_scalar::<_, RoleId>("SELECT role_id FROM role WHERE role_name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to look up role '{name}'"),
                    e,
                )
            })
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        login: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        let id = AccountId::new();

        sqlx::query(
            "INSERT INTO profile (profile_id, profile_login, profile_password) \
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(login)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(LOGIN_CONSTRAINT) => {
                AppError::conflict(format!("Login '{login}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create profile", e),
        })?;

        debug!(account_id = %id, login = %login, "Profile row inserted");

        Ok(Account {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            roles: Vec::new(),
        })
    }

    async fn delete(&self, _ctx: &RequestContext, login: &str) -> AppResult<bool> {
        // profile_role rows go with the profile through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM profile WHERE profile_login = $1")
            .bind(login)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete profile", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_role(
        &self,
        _ctx: &RequestContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO profile_role (profile_id, role_id) VALUES ($1, $2)")
            .bind(account_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::conflict("Role is already assigned")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to assign role", e),
            })?;

        Ok(())
    }
}
