//! In-process users repository.
//!
//! Used by tests and by the server when no database is configured for a
//! throwaway run. Failures can be injected per role to exercise the partial
//! outcomes of role assignment.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use authapi_core::error::AppError;
use authapi_core::result::AppResult;
use authapi_core::traits::UsersRepository;
use authapi_core::types::{Account, AccountId, RequestContext, RoleId, RoleName};

#[derive(Debug, Default)]
struct State {
    catalog: HashMap<RoleName, RoleId>,
    accounts: HashMap<String, Account>,
    failing_lookups: HashSet<RoleName>,
    failing_assignments: HashSet<RoleName>,
}

/// [`UsersRepository`] kept in a `RwLock`ed map.
#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    state: RwLock<State>,
}

impl InMemoryUsersRepository {
    /// An empty repository with the given role catalog.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = roles
            .into_iter()
            .map(|r| (RoleName::new(r.as_ref()), RoleId::new()))
            .collect();
        Self {
            state: RwLock::new(State {
                catalog,
                ..State::default()
            }),
        }
    }

    /// The catalog seeded by the database migrations: User, Admin, Editor.
    pub fn seeded() -> Self {
        Self::with_roles([RoleName::USER, RoleName::ADMIN, "Editor"])
    }

    /// Make every `get_role_id` call for `role` fail.
    pub async fn fail_role_lookup(&self, role: &str) {
        self.state
            .write()
            .await
            .failing_lookups
            .insert(RoleName::new(role));
    }

    /// Make every `assign_role` call for `role` fail.
    pub async fn fail_role_assignment(&self, role: &str) {
        self.state
            .write()
            .await
            .failing_assignments
            .insert(RoleName::new(role));
    }

    /// Number of stored accounts.
    pub async fn account_count(&self) -> usize {
        self.state.read().await.accounts.len()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn get_by_login(
        &self,
        _ctx: &RequestContext,
        login: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(login).cloned())
    }

    async fn get_roles_of(&self, _ctx: &RequestContext, login: &str) -> AppResult<Vec<RoleName>> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .get(login)
            .map(|a| a.roles.clone())
            .unwrap_or_default())
    }

    async fn list_role_catalog(&self, _ctx: &RequestContext) -> AppResult<HashSet<RoleName>> {
        Ok(self.state.read().await.catalog.keys().cloned().collect())
    }

    async fn get_role_id(
        &self,
        _ctx: &RequestContext,
        name: &RoleName,
    ) -> AppResult<Option<RoleId>> {
        let state = self.state.read().await;
        if state.failing_lookups.contains(name) {
            return Err(AppError::database(format!(
                "lookup of role '{name}' failed"
            )));
        }
        Ok(state.catalog.get(name).copied())
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        login: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(login) {
            return Err(AppError::conflict(format!("Login '{login}' already exists")));
        }
        let account = Account {
            id: AccountId::new(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            roles: Vec::new(),
        };
        state.accounts.insert(login.to_string(), account.clone());
        Ok(account)
    }

    async fn delete(&self, _ctx: &RequestContext, login: &str) -> AppResult<bool> {
        Ok(self.state.write().await.accounts.remove(login).is_some())
    }

    async fn assign_role(
        &self,
        _ctx: &RequestContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let role = state
            .catalog
            .iter()
            .find_map(|(name, id)| (*id == role_id).then(|| name.clone()))
            .ok_or_else(|| AppError::database(format!("role {role_id} is not in the catalog")))?;

        if state.failing_assignments.contains(&role) {
            return Err(AppError::database(format!("assignment of role '{role}' failed")));
        }

        let account = state
            .accounts
            .values_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| AppError::database(format!("account {account_id} does not exist")))?;

        if account.has_role(&role) {
            return Err(AppError::conflict("Role is already assigned"));
        }
        account.roles.push(role);
        Ok(())
    }
}
