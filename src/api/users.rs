// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints.
//!
//! All routes here are gated on the `users` module; the password digest
//! never appears in any response.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{password, Action, Guard, Module};
use crate::error::ApiError;
use crate::models::{
    CreateUserRequest, MessageResponse, UpdateUserRequest, UpdateUserStatusRequest, User,
    UserStatus, UserView,
};
use crate::state::AppState;
use crate::storage::{NewUser, StorageError};

/// Build the API view of a user: digest stripped, role and enterprise
/// names joined in.
pub(crate) fn user_view(state: &AppState, user: &User) -> Result<UserView, StorageError> {
    let role_name = match user.role_id {
        Some(role_id) => state.db.roles().get(role_id)?.map(|r| r.name),
        None => None,
    };
    let enterprise_name = match user.enterprise_id {
        Some(enterprise_id) => state.db.enterprises().get(enterprise_id)?.map(|e| e.name),
        None => None,
    };
    Ok(UserView {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        status: user.status,
        role_id: user.role_id,
        role_name,
        enterprise_id: user.enterprise_id,
        enterprise_name,
        last_login: user.last_login,
        created_at: user.created_at,
    })
}

/// List all users.
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users", body = [UserView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No read permission for users"),
    )
)]
pub async fn list_users(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.db.users().list()?;
    let mut views = Vec::with_capacity(users.len());
    for user in &users {
        views.push(user_view(&state, user)?);
    }
    Ok(Json(views))
}

/// Get a user by id.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The user", body = UserView),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Read as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .db
        .users()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user_view(&state, &user)?))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Username or email already exists"),
    )
)]
pub async fn create_user(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Create as u8 }>,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::bad_request(
            "Username, email, and password are required",
        ));
    }

    let password_hash = password::hash(&request.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::internal("Failed to create user")
    })?;

    let user = state.db.users().create(NewUser {
        username: request.username,
        email: request.email,
        password_hash,
        role_id: request.role_id,
        enterprise_id: request.enterprise_id,
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(user_view(&state, &user)?)))
}

/// Update an existing user. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already exists"),
    )
)]
pub async fn update_user(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    let mut user = state
        .db
        .users()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(username) = request.username {
        user.username = username;
    }
    if let Some(email) = request.email {
        user.email = email;
    }
    if let Some(role_id) = request.role_id {
        user.role_id = Some(role_id);
    }
    if let Some(enterprise_id) = request.enterprise_id {
        user.enterprise_id = Some(enterprise_id);
    }
    if let Some(status) = request.status {
        user.status = UserStatus::parse(&status).ok_or_else(|| {
            ApiError::bad_request("Invalid status. Must be active, inactive, or locked")
        })?;
    }

    state.db.users().update(&user)?;
    Ok(Json(user_view(&state, &user)?))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn delete_user(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Delete as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.db.users().get(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    state.db.users().delete(id)?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Lock, unlock, or deactivate a user account.
#[utoipa::path(
    patch,
    path = "/v1/users/{id}/status",
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUserStatusRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn update_user_status(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let status = UserStatus::parse(&request.status).ok_or_else(|| {
        ApiError::bad_request("Invalid status. Must be active, inactive, or locked")
    })?;

    if state.db.users().get(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    state.db.users().set_status(id, status)?;

    tracing::info!(user_id = id, status = %status, "user status changed");
    Ok(Json(MessageResponse::new(format!(
        "User {status} successfully"
    ))))
}

/// List the users of one enterprise.
#[utoipa::path(
    get,
    path = "/v1/users/enterprise/{enterprise_id}",
    params(("enterprise_id" = u64, Path, description = "Enterprise id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Users of the enterprise", body = [UserView]),
    )
)]
pub async fn list_users_by_enterprise(
    Guard(_identity): Guard<{ Module::Users as u8 }, { Action::Read as u8 }>,
    Path(enterprise_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.db.users().list_by_enterprise(enterprise_id)?;
    let mut views = Vec::with_capacity(users.len());
    for user in &users {
        views.push(user_view(&state, user)?);
    }
    Ok(Json(views))
}
