//! Shared fixture for service tests: in-memory collaborators and a cheap
//! hasher.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use authapi_auth::{JwtDecoder, JwtEncoder};
use authapi_core::config::{AuthConfig, StorageConfig};
use authapi_core::result::AppResult;
use authapi_core::traits::{
    CredentialHasher, FileStorage, ObjectMeta, StoredObject, UsersRepository,
};
use authapi_core::types::{Account, AccountId, RequestContext, RoleId, RoleName};
use authapi_database::InMemoryUsersRepository;
use authapi_storage::InMemoryFileStorage;

use crate::service::AuthorizationService;

/// Non-cryptographic hasher so tests do not pay for Argon2.
#[derive(Debug)]
pub(crate) struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

/// Switches that make existence lookups miss while writes still see the
/// stored data, as when a concurrent request lands between check and write.
#[derive(Debug, Default)]
pub(crate) struct StaleLookups {
    logins: AtomicBool,
    objects: AtomicBool,
}

impl StaleLookups {
    pub fn hide_logins(&self) {
        self.logins.store(true, Ordering::SeqCst);
    }

    pub fn hide_objects(&self) {
        self.objects.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct StaleUsersRepository {
    inner: Arc<InMemoryUsersRepository>,
    stale: Arc<StaleLookups>,
}

#[async_trait]
impl UsersRepository for StaleUsersRepository {
    async fn get_by_login(
        &self,
        ctx: &RequestContext,
        login: &str,
    ) -> AppResult<Option<Account>> {
        if self.stale.logins.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get_by_login(ctx, login).await
    }

    async fn get_roles_of(&self, ctx: &RequestContext, login: &str) -> AppResult<Vec<RoleName>> {
        self.inner.get_roles_of(ctx, login).await
    }

    async fn list_role_catalog(&self, ctx: &RequestContext) -> AppResult<HashSet<RoleName>> {
        self.inner.list_role_catalog(ctx).await
    }

    async fn get_role_id(
        &self,
        ctx: &RequestContext,
        name: &RoleName,
    ) -> AppResult<Option<RoleId>> {
        self.inner.get_role_id(ctx, name).await
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        login: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        self.inner.create(ctx, login, password_hash).await
    }

    async fn delete(&self, ctx: &RequestContext, login: &str) -> AppResult<bool> {
        self.inner.delete(ctx, login).await
    }

    async fn assign_role(
        &self,
        ctx: &RequestContext,
        account_id: AccountId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.inner.assign_role(ctx, account_id, role_id).await
    }
}

#[derive(Debug)]
struct StaleFileStorage {
    inner: Arc<InMemoryFileStorage>,
    stale: Arc<StaleLookups>,
}

#[async_trait]
impl FileStorage for StaleFileStorage {
    fn backend_type(&self) -> &str {
        self.inner.backend_type()
    }

    async fn create_bucket(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        self.inner.create_bucket(ctx, bucket).await
    }

    async fn remove_bucket(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        self.inner.remove_bucket(ctx, bucket).await
    }

    async fn remove_all_objects(&self, ctx: &RequestContext, bucket: &str) -> AppResult<()> {
        self.inner.remove_all_objects(ctx, bucket).await
    }

    async fn put_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
        content: Bytes,
        size: u64,
        content_type: &str,
    ) -> AppResult<()> {
        self.inner
            .put_object(ctx, bucket, name, content, size, content_type)
            .await
    }

    async fn get_object_meta(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<Option<ObjectMeta>> {
        if self.stale.objects.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get_object_meta(ctx, bucket, name).await
    }

    async fn delete_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<()> {
        self.inner.delete_object(ctx, bucket, name).await
    }

    async fn fetch_object_to_path(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
        dest: &Path,
    ) -> AppResult<()> {
        self.inner.fetch_object_to_path(ctx, bucket, name, dest).await
    }

    async fn list_objects(&self, ctx: &RequestContext, bucket: &str) -> AppResult<Vec<String>> {
        self.inner.list_objects(ctx, bucket).await
    }

    async fn read_object(
        &self,
        ctx: &RequestContext,
        bucket: &str,
        name: &str,
    ) -> AppResult<StoredObject> {
        self.inner.read_object(ctx, bucket, name).await
    }
}

pub(crate) struct Fixture {
    pub ctx: RequestContext,
    pub repo: Arc<InMemoryUsersRepository>,
    pub storage: Arc<InMemoryFileStorage>,
    pub stale: Arc<StaleLookups>,
    pub decoder: JwtDecoder,
    pub service: AuthorizationService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(InMemoryUsersRepository::seeded(), StorageConfig::default())
    }

    pub fn with_roles(roles: &[&str]) -> Self {
        Self::build(
            InMemoryUsersRepository::with_roles(roles.iter().copied()),
            StorageConfig::default(),
        )
    }

    pub fn with_storage_config(storage_config: StorageConfig) -> Self {
        Self::build(InMemoryUsersRepository::seeded(), storage_config)
    }

    fn build(repo: InMemoryUsersRepository, storage_config: StorageConfig) -> Self {
        let auth = AuthConfig {
            jwt_secret: "service-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let repo = Arc::new(repo);
        let storage = Arc::new(InMemoryFileStorage::new());
        let stale = Arc::new(StaleLookups::default());
        let service = AuthorizationService::new(
            Arc::new(StaleUsersRepository {
                inner: repo.clone(),
                stale: stale.clone(),
            }),
            Arc::new(StaleFileStorage {
                inner: storage.clone(),
                stale: stale.clone(),
            }),
            Arc::new(PlainHasher),
            Arc::new(JwtEncoder::new(&auth).expect("encoder")),
            &auth,
            storage_config,
        );
        Self {
            ctx: RequestContext::new(),
            repo,
            storage,
            stale,
            decoder: JwtDecoder::new(&auth),
            service,
        }
    }

    pub async fn register(&self, login: &str, password: &str) -> Account {
        self.service
            .register_user(&self.ctx, login, password)
            .await
            .expect("register")
    }
}
