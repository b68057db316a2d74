//! Account and role persistence contract.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Account, AccountId, RequestContext, RoleId, RoleName};

/// Persistence for accounts, the role catalog, and role assignments.
///
/// Every method receives the caller's [`RequestContext`]; implementations
/// may use it to abort in-flight work. Lookups that can miss return
/// `Ok(None)` instead of an error.
#[async_trait]
pub trait UsersRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account (with its roles) by exact login.
    async fn get_by_login(&self, ctx: &RequestContext, login: &str)
    -> AppResult<Option<Account>>;

    /// Roles currently assigned to the account, in assignment order.
    async fn get_roles_of(&self, ctx: &RequestContext, login: &str) -> AppResult<Vec<RoleName>>;

    /// Every role name in the catalog.
    async fn list_role_catalog(&self, ctx: &RequestContext) -> AppResult<HashSet<RoleName>>;

    /// Resolve a catalog role name to its identifier.
    async fn get_role_id(&self, ctx: &RequestContext, name: &RoleName)
    -> AppResult<Option<RoleId>>;

    /// Insert a new account without roles.
    ///
    /// A login that already exists is rejected with
    /// [`ErrorKind::Conflict`](crate::error::ErrorKind::Conflict).
    async fn create(
        &self,
        ctx: &RequestContext,
        login: &str,
        password_hash: &str,
    ) -> AppResult<Account>;

    /// Delete an account and its role assignments. Returns `false` if no
    /// account had that login.
    async fn delete(&self, ctx: &RequestContext, login: &str) -> AppResult<bool>;

    /// Record that an account holds a role.
    async fn assign_role(
        &self,
        ctx: &RequestContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()>;
}
