//! Shared fixtures for router tests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::models::{ContactMessage, Epaper, NewContactMessage, NewEpaper};
use crate::db::{MemoryStore, NewsStore, StoreError};
use crate::routes::auth::create_access_token;
use crate::state::AppState;
use crate::storage::{FileStorage, FileUpload, StorageError, StoredFile};

pub const ADMIN_ID: &str = "admin-1";
pub const ADMIN_EMAIL: &str = "editor@dainik.test";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

lazy_static::lazy_static! {
    // Minimum cost keeps the suite fast.
    static ref ADMIN_HASH: String = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
}

/// Accepts everything and pretends to be a CDN.
pub struct MemoryStorage;

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn upload(&self, file: FileUpload) -> Result<StoredFile, StorageError> {
        let file_id = Uuid::new_v4().to_string();
        Ok(StoredFile {
            url: format!("https://cdn.test/pdfs/{}", file.file_name),
            file_id,
            name: file.file_name,
            size: file.bytes.len() as i64,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Storage that is always down.
pub struct FailingStorage;

#[async_trait]
impl FileStorage for FailingStorage {
    async fn upload(&self, _file: FileUpload) -> Result<StoredFile, StorageError> {
        Err(StorageError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A store whose database never answers.
pub struct FailingStore;

#[async_trait]
impl NewsStore for FailingStore {
    async fn ping(&self) -> Result<std::time::Duration, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn list_epapers(&self) -> Result<Vec<Epaper>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn find_epaper_by_date(&self, _date: NaiveDate) -> Result<Option<Epaper>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn create_epaper(&self, _new: NewEpaper) -> Result<Epaper, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn delete_epaper(&self, _id: Uuid) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn increment_views(&self, _id: Uuid) -> Result<Option<i64>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn create_message(&self, _new: NewContactMessage) -> Result<ContactMessage, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn set_message_read(
        &self,
        _id: Uuid,
        _is_read: bool,
    ) -> Result<Option<ContactMessage>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn delete_message(&self, _id: Uuid) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable)
    }
}

pub fn test_auth() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        admin_id: ADMIN_ID.to_string(),
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password_hash: ADMIN_HASH.clone(),
        token_expiry_minutes: 60,
    }
}

pub fn test_state_with(storage: Arc<dyn FileStorage>) -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), storage, test_auth(), 1024 * 1024)
}

pub fn test_state_with_store(store: Arc<dyn NewsStore>) -> AppState {
    AppState::new(store, Arc::new(MemoryStorage), test_auth(), 1024 * 1024)
}

pub fn test_state() -> AppState {
    test_state_with(Arc::new(MemoryStorage))
}

/// `Authorization` header value for the test admin.
pub fn bearer(state: &AppState) -> String {
    let (token, _) = create_access_token(&state.auth, ADMIN_ID, ADMIN_EMAIL).unwrap();
    format!("Bearer {}", token)
}

/// Send a JSON request through the API router; non-JSON bodies come back as `Null`.
pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let app = crate::api_router().with_state(state.clone());
    send_to(&app, method, uri, authorization, body).await
}

/// Same as [`send`], against a fully layered app.
pub async fn send_to(
    app: &Router,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(authorization) = authorization {
        req = req.header("authorization", authorization);
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
}
