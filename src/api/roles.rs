// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role management endpoints.
//!
//! A role's permission set is replaced wholesale on update. Grant rows
//! with all four action booleans false are filtered out of every response;
//! they are equivalent to no grant at all.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{Action, Guard, Module};
use crate::error::ApiError;
use crate::models::{CreateRoleRequest, PermissionGrant, Role, RoleView, UpdateRoleRequest};
use crate::state::AppState;

/// Reject grants naming a module outside the fixed set.
fn validate_modules(grants: &[PermissionGrant]) -> Result<(), ApiError> {
    for grant in grants {
        if Module::parse(&grant.module).is_none() {
            return Err(ApiError::bad_request(format!(
                "Invalid module: {}",
                grant.module
            )));
        }
    }
    Ok(())
}

fn role_view(state: &AppState, role: Role) -> Result<RoleView, ApiError> {
    let mut permissions = state.db.roles().grants_for_role(role.id)?;
    permissions.retain(|g| !g.is_empty());
    Ok(RoleView { role, permissions })
}

/// List all roles.
#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All roles", body = [Role]),
        (status = 403, description = "No read permission for roles"),
    )
)]
pub async fn list_roles(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.db.roles().list()?))
}

/// The fixed set of modules grants can reference.
#[utoipa::path(
    get,
    path = "/v1/roles/modules",
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Available modules", body = [String]),
    )
)]
pub async fn list_modules(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Read as u8 }>,
) -> Json<Vec<&'static str>> {
    Json(Module::ALL.iter().map(|m| m.as_str()).collect())
}

/// Get a role by id, including its effective permissions.
#[utoipa::path(
    get,
    path = "/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role id")),
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The role with its grants", body = RoleView),
        (status = 404, description = "Role not found"),
    )
)]
pub async fn get_role(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Read as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<RoleView>, ApiError> {
    let role = state
        .db
        .roles()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;
    Ok(Json(role_view(&state, role)?))
}

/// Create a role together with its permission set.
#[utoipa::path(
    post,
    path = "/v1/roles",
    request_body = CreateRoleRequest,
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Missing name or empty permission set"),
        (status = 409, description = "Role name already exists"),
    )
)]
pub async fn create_role(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Create as u8 }>,
    State(state): State<AppState>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Role name is required"));
    }
    if request.permissions.is_empty() {
        return Err(ApiError::bad_request(
            "At least one permission must be selected",
        ));
    }
    if request.permissions.iter().all(|g| g.is_empty()) {
        return Err(ApiError::bad_request(
            "At least one permission must be selected for the role",
        ));
    }
    validate_modules(&request.permissions)?;

    let role = state
        .db
        .roles()
        .create(&request.name, request.description, &request.permissions)?;

    tracing::info!(role_id = role.id, name = %role.name, "role created");
    Ok((StatusCode::CREATED, Json(role)))
}

/// Update a role. A provided permission set replaces the old one
/// atomically.
#[utoipa::path(
    put,
    path = "/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role id")),
    request_body = UpdateRoleRequest,
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Role updated", body = RoleView),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists"),
    )
)]
pub async fn update_role(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<RoleView>, ApiError> {
    if let Some(grants) = &request.permissions {
        validate_modules(grants)?;
    }

    let role = state.db.roles().update(
        id,
        request.name.as_deref(),
        request.description,
        request.permissions.as_deref(),
    )?;

    Ok(Json(role_view(&state, role)?))
}

/// Delete a role. Refused while any user is assigned to it.
#[utoipa::path(
    delete,
    path = "/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role id")),
    tag = "Roles",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 400, description = "Role is assigned to users"),
        (status = 404, description = "Role not found"),
    )
)]
pub async fn delete_role(
    Guard(_identity): Guard<{ Module::Roles as u8 }, { Action::Delete as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.db.roles().get(id)?.is_none() {
        return Err(ApiError::not_found("Role not found"));
    }
    if state.db.users().any_with_role(id)? {
        return Err(ApiError::bad_request(
            "Cannot delete role that is assigned to users",
        ));
    }

    state.db.roles().delete(id)?;
    tracing::info!(role_id = id, "role deleted");
    Ok(StatusCode::NO_CONTENT)
}
