// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps [`TagvaultError`] onto HTTP status codes and JSON bodies.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tagvault_core::{AuthError, TagvaultError};

/// Generic message for every 500-class failure.
pub const SERVER_ERROR: &str = "Server error.";

/// Failure body: `{"success": false, "message": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Handler error wrapper.
#[derive(Debug)]
pub struct ApiError(pub TagvaultError);

impl From<TagvaultError> for ApiError {
    fn from(err: TagvaultError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TagvaultError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(TagvaultError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TagvaultError::Validation(_) => StatusCode::BAD_REQUEST,
            TagvaultError::Auth(_) => StatusCode::UNAUTHORIZED,
            TagvaultError::DuplicateIdentity | TagvaultError::Conflict(_) => StatusCode::CONFLICT,
            TagvaultError::NotFound(_) => StatusCode::NOT_FOUND,
            TagvaultError::Hardware(_) => StatusCode::SERVICE_UNAVAILABLE,
            TagvaultError::Decryption
            | TagvaultError::Crypto(_)
            | TagvaultError::Storage { .. }
            | TagvaultError::Config(_)
            | TagvaultError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; never includes internal detail.
    pub fn message(&self) -> String {
        match &self.0 {
            TagvaultError::Validation(msg) => msg.clone(),
            TagvaultError::Auth(AuthError::InvalidCredentials) => "Invalid credentials.".to_string(),
            TagvaultError::Auth(AuthError::TokenMismatch) => "RFID does not match.".to_string(),
            TagvaultError::Auth(AuthError::NotAuthorized) => "Not authenticated.".to_string(),
            TagvaultError::DuplicateIdentity => "Username or RFID already exists.".to_string(),
            TagvaultError::Conflict(msg) => msg.clone(),
            TagvaultError::NotFound(_) => "Not found.".to_string(),
            TagvaultError::Hardware(err) => err.to_string(),
            _ => SERVER_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        let body = ErrorBody {
            success: false,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
