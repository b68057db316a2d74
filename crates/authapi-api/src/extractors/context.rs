//! `RequestCtx` extractor: a fresh [`RequestContext`] per request.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use authapi_core::types::RequestContext;

use crate::state::AppState;

/// Request context bounded by `server.request_timeout_seconds` and
/// cancelled when the server shuts down.
#[derive(Debug, Clone)]
pub struct RequestCtx(pub RequestContext);

impl std::ops::Deref for RequestCtx {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for RequestCtx {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
        let ctx = RequestContext::with_timeout(timeout)
            .with_cancellation(state.shutdown.child_token());
        Ok(Self(ctx))
    }
}
