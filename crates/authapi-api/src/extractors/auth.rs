//! `AuthorizationHeader` extractor: the raw `Authorization` header value.
//!
//! Token checks need the target login from the request body, so the
//! header is only captured here and verified by the handler through
//! [`AccessGuard`](authapi_auth::AccessGuard).

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

/// The `Authorization` header, if present and valid UTF-8.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationHeader(pub Option<String>);

impl AuthorizationHeader {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for AuthorizationHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> AuthorizationHeader {
        let (mut parts, _) = request.into_parts();
        AuthorizationHeader::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_header_captured_verbatim() {
        let request = Request::builder()
            .header("authorization", "Bearer abc")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.as_deref(), None);
    }
}
