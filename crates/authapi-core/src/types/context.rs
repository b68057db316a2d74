//! Per-request cancellation and deadline context.
//!
//! A [`RequestContext`] is created by the transport layer for every inbound
//! request and passed unchanged through the service layer into every
//! repository and storage call. Services race each collaborator call
//! against the context so a cancelled or timed-out request returns
//! promptly with [`ErrorKind::Cancelled`](crate::error::ErrorKind) or
//! [`ErrorKind::Timeout`](crate::error::ErrorKind).

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Cancellation and deadline scope for a single request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID for logs.
    pub request_id: Uuid,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that times out `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_in(timeout)
    }

    /// Set the deadline relative to now. A timeout too large to represent
    /// leaves the context without a deadline.
    pub fn deadline_in(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Tie this context to an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel this request and every collaborator call still running for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fail fast if the request is already cancelled or past its deadline.
    pub fn check(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::cancelled("request was cancelled"));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AppError::timeout("request deadline exceeded"));
            }
        }
        Ok(())
    }

    /// Run a collaborator call under this context.
    ///
    /// The call is dropped as soon as the request is cancelled or its
    /// deadline passes.
    pub async fn run<T, F>(&self, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::cancelled("request was cancelled")),
            _ = sleep_until(self.deadline) => Err(AppError::timeout("request deadline exceeded")),
            result = call => result,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
