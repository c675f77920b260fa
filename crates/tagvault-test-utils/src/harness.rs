// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end gateway tests.
//!
//! `TestHarness` assembles the full router over an in-memory SQLite store,
//! cheap KDF costs and a [`MockTagReader`], then drives it in-process with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use tagvault_auth::{AuthService, SessionRegistry, VaultService};
use tagvault_config::CryptoConfig;
use tagvault_core::{CredentialStore, TagReader, TagvaultError};
use tagvault_gateway::{AppState, SESSION_COOKIE, SessionCookies, build_router};
use tagvault_storage::SqliteStore;
use tagvault_vault::KeyManager;

use crate::mock_reader::MockTagReader;

/// Session signing secret used by every harness.
pub const TEST_SESSION_SECRET: &str = "tagvault-test-session-secret-0123456789";

/// KDF costs far below the production floor, for fast tests only.
pub fn fast_crypto() -> CryptoConfig {
    CryptoConfig {
        scrypt_log_n: 10,
        scrypt_r: 8,
        scrypt_p: 1,
        password_memory_cost: 1024,
        password_iterations: 1,
        password_parallelism: 1,
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    idle_timeout: Duration,
    scan_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            idle_timeout: Duration::from_secs(900),
            scan_timeout: Duration::from_millis(200),
        }
    }

    /// Override the session idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestHarness, TagvaultError> {
        let store = Arc::new(SqliteStore::in_memory().await?);
        let dyn_store: Arc<dyn CredentialStore> = store.clone();
        let reader = Arc::new(MockTagReader::new());
        let dyn_reader: Arc<dyn TagReader> = reader.clone();

        let auth = Arc::new(AuthService::new(
            Arc::clone(&dyn_store),
            Arc::new(KeyManager::new(fast_crypto())?),
            Arc::new(SessionRegistry::new(self.idle_timeout)),
        ));
        let vault = Arc::new(VaultService::new(Arc::clone(&dyn_store)));
        let cookies =
            SessionCookies::new(&SecretString::from(TEST_SESSION_SECRET.to_string()), false)?;

        let state = AppState {
            auth: Arc::clone(&auth),
            vault,
            store: dyn_store,
            reader: dyn_reader,
            scan_timeout: self.scan_timeout,
            cookies,
        };

        Ok(TestHarness {
            router: build_router(state),
            store,
            reader,
            auth,
        })
    }
}

/// A captured response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// `name=value` of a `tagvault_session` Set-Cookie header, if present.
    pub session_cookie: Option<String>,
    /// The full Set-Cookie header for the session cookie.
    pub raw_set_cookie: Option<String>,
}

impl TestResponse {
    pub fn success(&self) -> bool {
        self.body["success"].as_bool().unwrap_or(false)
    }

    pub fn message(&self) -> Option<&str> {
        self.body["message"].as_str()
    }
}

/// A complete in-process gateway.
pub struct TestHarness {
    router: Router,
    pub store: Arc<SqliteStore>,
    pub reader: Arc<MockTagReader>,
    pub auth: Arc<AuthService>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub async fn new() -> Result<Self, TagvaultError> {
        Self::builder().build().await
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<TestResponse, TagvaultError> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| TagvaultError::Internal(format!("bad test request: {e}")))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| TagvaultError::Internal(format!("router failed: {e}")))?;

        let status = response.status();
        let raw_set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(SESSION_COOKIE))
            .map(str::to_string);
        let session_cookie = raw_set_cookie
            .as_deref()
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| TagvaultError::Internal(format!("body read failed: {e}")))?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(TestResponse {
            status,
            body,
            session_cookie,
            raw_set_cookie,
        })
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<TestResponse, TagvaultError> {
        self.request(Method::GET, path, None, cookie).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        cookie: Option<&str>,
    ) -> Result<TestResponse, TagvaultError> {
        self.request(Method::POST, path, Some(body), cookie).await
    }

    /// Register an identity over HTTP.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        tag: &str,
    ) -> Result<TestResponse, TagvaultError> {
        self.post(
            "/api/auth/register",
            serde_json::json!({
                "username": username,
                "password": password,
                "rfid_uid": tag,
            }),
            None,
        )
        .await
    }

    /// Log in and return the session cookie (`name=value`).
    pub async fn login(&self, username: &str, password: &str) -> Result<String, TagvaultError> {
        let resp = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await?;
        resp.session_cookie
            .ok_or_else(|| TagvaultError::Internal(format!("login failed: {}", resp.body)))
    }

    /// Register, log in and verify the tag; returns the session cookie.
    pub async fn authenticated(
        &self,
        username: &str,
        password: &str,
        tag: &str,
    ) -> Result<String, TagvaultError> {
        self.register(username, password, tag).await?;
        let cookie = self.login(username, password).await?;
        let resp = self
            .post(
                "/api/auth/rfid-verify",
                serde_json::json!({ "rfid_uid": tag }),
                Some(&cookie),
            )
            .await?;
        if resp.status != StatusCode::OK {
            return Err(TagvaultError::Internal(format!(
                "token verification failed: {}",
                resp.body
            )));
        }
        Ok(cookie)
    }
}
