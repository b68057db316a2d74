//! Role assignment.
//!
//! `add_roles` takes a whitespace-separated list of role names, canonicalizes
//! each one, and reports a status per name. Names are processed in order.
//! A failed id lookup is recorded and skipped; a failed assignment write
//! stops processing and is returned next to the statuses gathered so far.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use authapi_core::error::{AppError, ErrorKind};
use authapi_core::result::AppResult;
use authapi_core::types::{RequestContext, RoleName};

use crate::service::AuthorizationService;

/// Outcome of assigning one requested role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStatus {
    /// The role is not in the catalog.
    Unknown,
    /// The account already holds the role.
    AlreadyAssigned,
    /// Looking up the role id failed; carries the error text.
    LookupFailed(String),
    /// The role was assigned.
    Added,
}

impl fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("this role does not exist"),
            Self::AlreadyAssigned => f.write_str("user already has this role"),
            Self::LookupFailed(reason) => f.write_str(reason),
            Self::Added => f.write_str("role was successfully added"),
        }
    }
}

impl Serialize for RoleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Status per canonical role name.
pub type RoleStatuses = BTreeMap<RoleName, RoleStatus>;

/// Result of an `add_roles` call.
///
/// `error` is set when an assignment write failed; `statuses` then holds
/// every role processed before the failure.
#[derive(Debug, Clone, Default)]
pub struct AddRolesOutcome {
    pub statuses: RoleStatuses,
    pub error: Option<AppError>,
}

impl AddRolesOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl AuthorizationService {
    /// Assign the roles in `role_names` to `login`.
    ///
    /// Fails outright with `UnexistingLogin` for an unknown account and with
    /// the collaborator error when the catalog cannot be read. The caller
    /// must already have passed the admin check.
    pub async fn add_roles(
        &self,
        ctx: &RequestContext,
        login: &str,
        role_names: &str,
    ) -> AppResult<AddRolesOutcome> {
        let account = self.require_account(ctx, login).await?;
        let mut held: HashSet<RoleName> = ctx
            .run(self.repo.get_roles_of(ctx, login))
            .await?
            .into_iter()
            .collect();
        let catalog = ctx.run(self.repo.list_role_catalog(ctx)).await?;

        let mut outcome = AddRolesOutcome::default();

        for role in role_names.split_whitespace().map(RoleName::new) {
            if !catalog.contains(&role) {
                outcome.statuses.insert(role, RoleStatus::Unknown);
                continue;
            }

            if held.contains(&role) {
                outcome.statuses.insert(role, RoleStatus::AlreadyAssigned);
                continue;
            }

            let role_id = match ctx.run(self.repo.get_role_id(ctx, &role)).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    outcome.statuses.insert(role, RoleStatus::Unknown);
                    continue;
                }
                Err(e) if e.kind.is_precondition() || is_request_abort(&e) => return Err(e),
                Err(e) => {
                    warn!(login = %login, role = %role, error = %e, "Role id lookup failed");
                    outcome
                        .statuses
                        .insert(role, RoleStatus::LookupFailed(e.message));
                    continue;
                }
            };

            if let Err(e) = ctx
                .run(self.repo.assign_role(ctx, account.id, role_id))
                .await
            {
                warn!(login = %login, role = %role, error = %e, "Role assignment failed");
                outcome.error = Some(e);
                return Ok(outcome);
            }

            info!(login = %login, role = %role, "Role assigned");
            held.insert(role.clone());
            outcome.statuses.insert(role, RoleStatus::Added);
        }

        Ok(outcome)
    }
}

fn is_request_abort(err: &AppError) -> bool {
    matches!(err.kind, ErrorKind::Cancelled | ErrorKind::Timeout)
}
