// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for `/api/auth/*`, `/api/vault` and `/health`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tagvault_auth::{AuthState, EntryInput, VaultEntry};
use tagvault_core::{AuthError, HardwareError, HealthStatus, TagvaultError, UserId};

use crate::auth::SessionId;
use crate::error::ApiError;
use crate::server::AppState;

type Body<T> = Result<Json<T>, JsonRejection>;

/// Request body for POST /api/auth/register.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(alias = "rfid_uid")]
    pub token_identifier: String,
}

/// Request body for POST /api/auth/login.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for POST /api/auth/rfid-verify.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    #[serde(alias = "rfid_uid")]
    pub token_identifier: String,
}

/// Request body for POST /api/auth/change-password.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for POST /api/vault and PUT /api/vault/{id}.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct EntryRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl From<EntryRequest> for EntryInput {
    fn from(req: EntryRequest) -> Self {
        EntryInput {
            name: req.name,
            username: req.username,
            password: req.password,
            url: req.url,
            notes: req.notes,
        }
    }
}

/// `{"success": true}`
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

const ACK: Ack = Ack { success: true };

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: UserId,
    pub state: AuthState,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub success: bool,
    pub state: AuthState,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub secret: String,
    pub counter: i64,
}

/// Scan result. `uid` is null when no tag was read.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub uid: Option<String>,
}

/// One listed credential.
#[derive(Serialize)]
pub struct CredentialView {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub decryptable: bool,
}

impl From<VaultEntry> for CredentialView {
    fn from(entry: VaultEntry) -> Self {
        CredentialView {
            id: entry.id,
            name: entry.name,
            username: entry.username,
            password: entry.password,
            url: entry.url,
            notes: entry.notes,
            decryptable: entry.decryptable,
        }
    }
}

#[derive(Serialize)]
pub struct CredentialList {
    pub success: bool,
    pub credentials: Vec<CredentialView>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Body<RegisterRequest>,
) -> Result<(StatusCode, Json<Ack>), ApiError> {
    let Json(req) = body?;
    state
        .auth
        .register(
            &req.username,
            SecretString::from(req.password),
            &req.token_identifier,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ACK)))
}

/// POST /api/auth/login
///
/// Always issues a fresh session cookie; the caller's previous session is
/// discarded.
pub async fn login(
    State(state): State<AppState>,
    session: SessionId,
    jar: CookieJar,
    body: Body<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(req) = body?;
    let outcome = state
        .auth
        .login(
            &req.username,
            SecretString::from(req.password),
            session.as_deref(),
        )
        .await?;
    let jar = state.cookies.issue(jar, &outcome.session_id);
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user_id: outcome.user_id,
            state: outcome.state,
        }),
    ))
}

/// GET /api/auth/initialize-rfid
pub async fn initialize_rfid(
    State(state): State<AppState>,
    session: SessionId,
) -> Result<Json<TokenResponse>, ApiError> {
    let grant = state.auth.initialize_token(session.as_deref()).await?;
    Ok(Json(TokenResponse {
        success: true,
        secret: grant.secret_hex,
        counter: grant.counter,
    }))
}

/// GET /api/auth/rfid-scan
///
/// Requires a session past the password step. Timeouts, unreadable devices
/// and serial I/O failures are a normal `uid: null`; only a missing or
/// unauthorized reader is 503.
pub async fn rfid_scan(State(state): State<AppState>, session: SessionId) -> Response {
    if state.auth.status(session.as_deref()).await == AuthState::Unauthenticated {
        return ApiError::from(AuthError::NotAuthorized).into_response();
    }
    match state.reader.scan(state.scan_timeout).await {
        Ok(outcome) => scan_response(outcome.identifier().map(str::to_string)).into_response(),
        Err(TagvaultError::Hardware(HardwareError::Io(reason))) => {
            tracing::warn!(%reason, "tag reader I/O failed, reporting no tag");
            scan_response(None).into_response()
        }
        Err(TagvaultError::Hardware(err)) => {
            tracing::warn!(error = %err, "tag reader unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ScanResponse {
                    success: false,
                    uid: None,
                }),
            )
                .into_response()
        }
        Err(err) => ApiError(err).into_response(),
    }
}

fn scan_response(uid: Option<String>) -> Json<ScanResponse> {
    Json(ScanResponse { success: true, uid })
}

/// POST /api/auth/rfid-verify
pub async fn rfid_verify(
    State(state): State<AppState>,
    session: SessionId,
    body: Body<VerifyRequest>,
) -> Result<Json<StateResponse>, ApiError> {
    let Json(req) = body?;
    let auth_state = state
        .auth
        .verify_token(session.as_deref(), &req.token_identifier)
        .await?;
    Ok(Json(StateResponse {
        success: true,
        state: auth_state,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    session: SessionId,
    jar: CookieJar,
) -> (CookieJar, Json<Ack>) {
    state.auth.logout(session.as_deref()).await;
    (state.cookies.clear(jar), Json(ACK))
}

/// GET /api/auth/status
pub async fn status(State(state): State<AppState>, session: SessionId) -> Json<StateResponse> {
    Json(StateResponse {
        success: true,
        state: state.auth.status(session.as_deref()).await,
    })
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    session: SessionId,
    body: Body<ChangePasswordRequest>,
) -> Result<Json<Ack>, ApiError> {
    let ctx = state.auth.context(session.as_deref()).await?;
    let Json(req) = body?;
    if req.current_password.is_empty() {
        return Err(TagvaultError::Validation("current password is required".to_string()).into());
    }
    state
        .auth
        .change_password(
            &ctx,
            SecretString::from(req.current_password),
            SecretString::from(req.new_password),
        )
        .await?;
    Ok(Json(ACK))
}

/// GET /api/vault
pub async fn list_entries(
    State(state): State<AppState>,
    session: SessionId,
) -> Result<Json<CredentialList>, ApiError> {
    let ctx = state.auth.context(session.as_deref()).await?;
    let entries = state.vault.list(&ctx).await?;
    Ok(Json(CredentialList {
        success: true,
        credentials: entries.into_iter().map(CredentialView::from).collect(),
    }))
}

/// POST /api/vault
pub async fn add_entry(
    State(state): State<AppState>,
    session: SessionId,
    body: Body<EntryRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let ctx = state.auth.context(session.as_deref()).await?;
    let Json(req) = body?;
    let id = state.vault.add(&ctx, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { success: true, id }),
    ))
}

/// PUT /api/vault/{id}
pub async fn update_entry(
    State(state): State<AppState>,
    session: SessionId,
    path: Result<Path<String>, PathRejection>,
    body: Body<EntryRequest>,
) -> Result<Json<Ack>, ApiError> {
    let ctx = state.auth.context(session.as_deref()).await?;
    let Path(id) = path?;
    let Json(req) = body?;
    state.vault.update(&ctx, &id, req.into()).await?;
    Ok(Json(ACK))
}

/// DELETE /api/vault/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    session: SessionId,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Ack>, ApiError> {
    let ctx = state.auth.context(session.as_deref()).await?;
    let Path(id) = path?;
    state.vault.delete(&ctx, &id).await?;
    Ok(Json(ACK))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(HealthStatus::Degraded(_)) => "degraded",
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "store unhealthy");
            "unhealthy"
        }
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            "unhealthy"
        }
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_rfid_uid_alias() {
        let json = r#"{"username": "alice", "password": "pw1", "rfid_uid": "TAGX"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.token_identifier, "TAGX");

        let json = r#"{"username": "alice", "password": "pw1", "token_identifier": "TAGY"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.token_identifier, "TAGY");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_empty());
        assert!(req.password.is_empty());

        let req: EntryRequest = serde_json::from_str(r#"{"name": "site"}"#).unwrap();
        assert_eq!(req.name, "site");
        assert!(req.url.is_empty());
    }

    #[test]
    fn login_response_serializes_state_in_snake_case() {
        let json = serde_json::to_string(&LoginResponse {
            success: true,
            user_id: 7,
            state: AuthState::PasswordVerified,
        })
        .unwrap();
        assert!(json.contains("\"user_id\":7"));
        assert!(json.contains("\"state\":\"password_verified\""));
    }

    #[test]
    fn scan_response_keeps_null_uid() {
        let json = serde_json::to_string(&ScanResponse {
            success: true,
            uid: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"success":true,"uid":null}"#);
    }
}
