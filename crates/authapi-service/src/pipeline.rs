//! Ordered, non-transactional workflows.
//!
//! Registration and unregistration are sequences of independent
//! collaborator calls. Nothing is rolled back: when a step fails the steps
//! before it stay done, the error keeps its kind, and its message names the
//! failing step.
//!
//! | Pipeline   | Step             | State left behind when this step fails        |
//! |------------|------------------|-----------------------------------------------|
//! | register   | create account   | nothing                                       |
//! | register   | assign role      | account without roles, no bucket              |
//! | register   | create bucket    | account with `User`, no bucket                |
//! | unregister | remove objects   | account and bucket, some objects may be gone  |
//! | unregister | remove bucket    | account and an empty bucket                   |
//! | unregister | delete account   | account without a bucket                      |
//!
//! An account left without a bucket can still be unregistered: the
//! unregister pipeline skips the storage steps when the bucket is gone.

use std::fmt;
use std::future::Future;

use tracing::{debug, warn};

use authapi_core::result::AppResult;
use authapi_core::types::RequestContext;

/// A named step of a multi-step workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateAccount,
    AssignDefaultRole,
    CreateBucket,
    RemoveObjects,
    RemoveBucket,
    DeleteAccount,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAccount => "create account",
            Self::AssignDefaultRole => "assign default role",
            Self::CreateBucket => "create bucket",
            Self::RemoveObjects => "remove objects",
            Self::RemoveBucket => "remove bucket",
            Self::DeleteAccount => "delete account",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one pipeline step under the request context.
///
/// Collaborator failures are logged and their message is prefixed with the
/// step name. Named precondition errors (e.g. `ExistingLogin`) are returned
/// as they are so callers see the exact message.
pub async fn run_step<T, F>(ctx: &RequestContext, login: &str, step: Step, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match ctx.run(call).await {
        Ok(value) => {
            debug!(login = %login, step = %step, "Pipeline step completed");
            Ok(value)
        }
        Err(err) if err.kind.is_precondition() => Err(err),
        Err(err) => {
            warn!(
                login = %login,
                step = %step,
                request_id = %ctx.request_id,
                error = %err,
                "Pipeline step failed, completed steps are kept"
            );
            Err(err.context(step))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authapi_core::error::{AppError, ErrorKind};

    #[tokio::test]
    async fn test_failure_names_step_and_keeps_kind() {
        let ctx = RequestContext::new();
        let err = run_step(&ctx, "alice", Step::CreateBucket, async {
            Err::<(), _>(AppError::storage("disk full"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(err.message, "create bucket: disk full");
    }

    #[tokio::test]
    async fn test_precondition_passes_through() {
        let ctx = RequestContext::new();
        let err = run_step(&ctx, "alice", Step::CreateAccount, async {
            Err::<(), _>(AppError::existing_login())
        })
        .await
        .unwrap_err();
        assert_eq!(err.message, "user with such login already exists");
    }
}
