// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! The token-verification variants are kept distinct internally (useful in
//! logs and tests) but share one caller-facing message and error code, so
//! responses never reveal which verification step failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Authentication/authorization error type.
#[derive(Debug)]
pub enum AuthError {
    /// No bearer token present on the request
    MissingToken,
    /// Token is structurally malformed
    MalformedToken,
    /// Token signature does not verify
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Subject user is missing, inactive, or locked
    UserNotFoundOrInactive,
    /// Permission evaluation was attempted without an identity
    AuthenticationRequired,
    /// The identity's role has no grant row for the module
    NoModulePermissions,
    /// The grant row exists but the requested action bit is false
    PermissionDenied {
        module: &'static str,
        action: &'static str,
    },
    /// A module/action discriminant outside the closed enums reached the gate
    UnsupportedAction,
    /// Credential hashing/verification failed for environmental reasons
    /// (e.g. malformed stored digest), distinct from "wrong password"
    Crypto(String),
    /// Storage failure during identity resolution or permission lookup
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            // One public code for every token-verification failure.
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => "invalid_token",
            AuthError::UserNotFoundOrInactive => "user_not_found_or_inactive",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::NoModulePermissions => "no_module_permissions",
            AuthError::PermissionDenied { .. } => "permission_denied",
            AuthError::UnsupportedAction => "unsupported_action",
            AuthError::Crypto(_) | AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::UserNotFoundOrInactive
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::NoModulePermissions
            | AuthError::PermissionDenied { .. }
            | AuthError::UnsupportedAction => StatusCode::FORBIDDEN,
            AuthError::Crypto(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Access token required"),
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => write!(f, "Invalid or expired token"),
            AuthError::UserNotFoundOrInactive => write!(f, "User not found or inactive"),
            AuthError::AuthenticationRequired => write!(f, "Authentication required"),
            AuthError::NoModulePermissions => write!(f, "No permissions for this module"),
            AuthError::PermissionDenied { module, action } => {
                write!(f, "No {action} permission for {module}")
            }
            AuthError::UnsupportedAction => write!(f, "Unsupported action"),
            AuthError::Crypto(_) | AuthError::Internal(_) => write!(f, "Authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Crypto(detail) | AuthError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "authentication internal error");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_token");
        assert_eq!(body["error"], "Access token required");
    }

    #[tokio::test]
    async fn permission_denied_returns_403_naming_module_and_action() {
        let response = AuthError::PermissionDenied {
            module: "products",
            action: "delete",
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "No delete permission for products");
    }

    #[test]
    fn token_failures_share_one_public_shape() {
        for err in [
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
        ] {
            assert_eq!(err.error_code(), "invalid_token");
            assert_eq!(err.to_string(), "Invalid or expired token");
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AuthError::Crypto("bad digest encoding".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Authentication error");
    }
}
