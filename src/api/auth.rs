// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints: login, logout, password reset, profile.
//!
//! Login is the only place where lockout is reported explicitly; every
//! other credential failure collapses into one generic message so the
//! response never confirms whether a username exists.

use axum::{extract::State, Json};

use crate::auth::{password, Auth};
use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, ResetPasswordRequest, UserStatus, UserView,
};
use crate::state::AppState;

use super::users::user_view;

/// Authenticate with username and password, returning a session token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials or inactive account"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    // Unknown username and wrong password share one message.
    let user = state
        .db
        .users()
        .get_by_username(&request.username)?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if user.status != UserStatus::Active {
        return Err(ApiError::unauthorized("Account is locked or inactive"));
    }

    let valid = password::verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "password verification failed");
        ApiError::internal("Login failed")
    })?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    state.db.users().record_login(user.id)?;

    let token = state.tokens.issue(&user).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "token issuance failed");
        ApiError::internal("Login failed")
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "login successful");

    let user = user_view(&state, &user)?;
    Ok(Json(LoginResponse { user, token }))
}

/// Log out of the current session.
///
/// Tokens stay valid until expiry; there is no server-side revocation
/// list. This endpoint exists so clients have an explicit end-of-session
/// call.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn logout(Auth(identity): Auth) -> Json<MessageResponse> {
    tracing::info!(user_id = identity.id, "logout");
    Json(MessageResponse::new("Logout successful"))
}

/// Reset a user's password by email.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Password reset successful", body = MessageResponse),
        (status = 400, description = "Missing email or new password"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.email.trim().is_empty() || request.new_password.is_empty() {
        return Err(ApiError::bad_request("Email and new password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_email(&request.email)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let digest = password::hash(&request.new_password).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "password hashing failed");
        ApiError::internal("Password reset failed")
    })?;
    state.db.users().set_password(user.id, digest)?;

    tracing::info!(user_id = user.id, "password reset");
    Ok(Json(MessageResponse::new("Password reset successful")))
}

/// Get the current authenticated user's profile.
#[utoipa::path(
    get,
    path = "/v1/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn profile(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .db
        .users()
        .get(identity.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user_view(&state, &user)?))
}
