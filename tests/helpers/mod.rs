//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use authapi_api::{AppState, build_app};
use authapi_auth::{AccessGuard, JwtDecoder, JwtEncoder};
use authapi_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, RepositoryBackend, ServerConfig,
    StorageBackend, StorageConfig,
};
use authapi_core::result::AppResult;
use authapi_core::traits::CredentialHasher;
use authapi_core::types::RoleName;
use authapi_database::InMemoryUsersRepository;
use authapi_service::AuthorizationService;
use authapi_storage::InMemoryFileStorage;

pub const BOUNDARY: &str = "authapi-test-boundary";

/// Non-cryptographic hasher so tests do not pay for Argon2.
#[derive(Debug)]
struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Accounts and roles
    pub repo: Arc<InMemoryUsersRepository>,
    /// Buckets
    pub storage: Arc<InMemoryFileStorage>,
    /// Mints tokens the server accepts
    pub encoder: Arc<JwtEncoder>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage_config(StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        })
    }

    pub fn with_storage_config(storage: StorageConfig) -> Self {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                backend: RepositoryBackend::Memory,
                ..DatabaseConfig::default()
            },
            auth: AuthConfig {
                jwt_secret: "integration-test-secret".to_string(),
                ..AuthConfig::default()
            },
            storage,
            logging: LoggingConfig::default(),
        };

        let repo = Arc::new(InMemoryUsersRepository::seeded());
        let storage = Arc::new(InMemoryFileStorage::new());
        let encoder = Arc::new(JwtEncoder::new(&config.auth).expect("encoder"));
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let guard = Arc::new(AccessGuard::new(decoder, &config.auth));

        let service = Arc::new(AuthorizationService::new(
            repo.clone(),
            storage.clone(),
            Arc::new(PlainHasher),
            encoder.clone(),
            &config.auth,
            config.storage.clone(),
        ));

        let state = AppState::new(
            Arc::new(config.clone()),
            service,
            guard,
            CancellationToken::new(),
        );

        Self {
            router: build_app(state),
            repo,
            storage,
            encoder,
            config,
        }
    }

    /// Register an account through the API and return its access token.
    pub async fn register_and_login(&self, login: &str, password: &str) -> String {
        let credentials = serde_json::json!({ "login": login, "password": password });

        let response = self
            .request("POST", "/user/register", Some(credentials.clone()), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "register: {:?}", response.body);

        let response = self
            .request("POST", "/user/login", Some(credentials), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "login: {:?}", response.body);

        response.body["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }

    /// A token whose only role is Admin, for an account that need not exist.
    pub fn admin_token(&self) -> String {
        self.encoder
            .issue("root", &[RoleName::admin()])
            .expect("issue admin token")
            .access_token
    }

    /// Send a JSON request
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a multipart upload with `login` and one `file` part.
    pub async fn upload(
        &self,
        login: &str,
        file_name: &str,
        content_type: &str,
        content: &[u8],
        token: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"login\"\r\n\r\n{login}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        self.upload_body(body, token).await
    }

    /// Send `body` verbatim as a multipart upload.
    pub async fn upload_body(&self, body: Vec<u8>, token: Option<&str>) -> TestResponse {
        let mut req = Request::builder()
            .method("POST")
            .uri("/user/uploadFile")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = req.body(Body::from(body)).expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON body (`Null` if not JSON)
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}
