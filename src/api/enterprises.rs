// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enterprise (tenant) management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{Action, Guard, Module};
use crate::error::ApiError;
use crate::models::{
    CreateEnterpriseRequest, Enterprise, EnterpriseView, UpdateEnterpriseRequest,
};
use crate::state::AppState;

fn enterprise_view(state: &AppState, enterprise: Enterprise) -> Result<EnterpriseView, ApiError> {
    let user_count = state.db.users().count(Some(enterprise.id))?;
    let employee_count = state.db.employees().count(Some(enterprise.id))?;
    let product_count = state.db.products().count(Some(enterprise.id))?;
    Ok(EnterpriseView {
        enterprise,
        user_count,
        employee_count,
        product_count,
    })
}

/// List all enterprises with attachment counts.
#[utoipa::path(
    get,
    path = "/v1/enterprises",
    tag = "Enterprises",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All enterprises", body = [EnterpriseView]),
        (status = 403, description = "No read permission for enterprises"),
    )
)]
pub async fn list_enterprises(
    Guard(_identity): Guard<{ Module::Enterprises as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnterpriseView>>, ApiError> {
    let enterprises = state.db.enterprises().list()?;
    let mut views = Vec::with_capacity(enterprises.len());
    for enterprise in enterprises {
        views.push(enterprise_view(&state, enterprise)?);
    }
    Ok(Json(views))
}

/// Get an enterprise by id with attachment counts.
#[utoipa::path(
    get,
    path = "/v1/enterprises/{id}",
    params(("id" = u64, Path, description = "Enterprise id")),
    tag = "Enterprises",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The enterprise", body = EnterpriseView),
        (status = 404, description = "Enterprise not found"),
    )
)]
pub async fn get_enterprise(
    Guard(_identity): Guard<{ Module::Enterprises as u8 }, { Action::Read as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<EnterpriseView>, ApiError> {
    let enterprise = state
        .db
        .enterprises()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Enterprise not found"))?;
    Ok(Json(enterprise_view(&state, enterprise)?))
}

/// Create a new enterprise.
#[utoipa::path(
    post,
    path = "/v1/enterprises",
    request_body = CreateEnterpriseRequest,
    tag = "Enterprises",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Enterprise created", body = Enterprise),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Enterprise name already exists"),
    )
)]
pub async fn create_enterprise(
    Guard(_identity): Guard<{ Module::Enterprises as u8 }, { Action::Create as u8 }>,
    State(state): State<AppState>,
    Json(request): Json<CreateEnterpriseRequest>,
) -> Result<(StatusCode, Json<Enterprise>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Enterprise name is required"));
    }

    let enterprise = state
        .db
        .enterprises()
        .create(&request.name, request.location, request.contact_info)?;

    tracing::info!(enterprise_id = enterprise.id, name = %enterprise.name, "enterprise created");
    Ok((StatusCode::CREATED, Json(enterprise)))
}

/// Update an enterprise. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/v1/enterprises/{id}",
    params(("id" = u64, Path, description = "Enterprise id")),
    request_body = UpdateEnterpriseRequest,
    tag = "Enterprises",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Enterprise updated", body = Enterprise),
        (status = 404, description = "Enterprise not found"),
        (status = 409, description = "Enterprise name already exists"),
    )
)]
pub async fn update_enterprise(
    Guard(_identity): Guard<{ Module::Enterprises as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateEnterpriseRequest>,
) -> Result<Json<Enterprise>, ApiError> {
    let mut enterprise = state
        .db
        .enterprises()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Enterprise not found"))?;

    if let Some(name) = request.name {
        enterprise.name = name;
    }
    if let Some(location) = request.location {
        enterprise.location = Some(location);
    }
    if let Some(contact_info) = request.contact_info {
        enterprise.contact_info = Some(contact_info);
    }
    if let Some(status) = request.status {
        enterprise.status = status;
    }

    state.db.enterprises().update(&enterprise)?;
    Ok(Json(enterprise))
}

/// Delete an enterprise.
#[utoipa::path(
    delete,
    path = "/v1/enterprises/{id}",
    params(("id" = u64, Path, description = "Enterprise id")),
    tag = "Enterprises",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Enterprise deleted"),
        (status = 404, description = "Enterprise not found"),
    )
)]
pub async fn delete_enterprise(
    Guard(_identity): Guard<{ Module::Enterprises as u8 }, { Action::Delete as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if !state.db.enterprises().exists(id)? {
        return Err(ApiError::not_found("Enterprise not found"));
    }
    state.db.enterprises().delete(id)?;
    tracing::info!(enterprise_id = id, "enterprise deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::models::UserStatus;
    use crate::state::test_support::test_state;
    use crate::storage::{NewEmployee, NewUser};

    fn admin_identity(state: &AppState) -> Identity {
        let role = state.db.roles().create("Admin", None, &[]).unwrap();
        Identity {
            id: 0,
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            status: UserStatus::Active,
            role_id: Some(role.id),
            role_name: Some(role.name),
            enterprise_id: None,
            enterprise_name: None,
        }
    }

    #[tokio::test]
    async fn create_requires_name() {
        let (state, _dir) = test_state();
        let admin = admin_identity(&state);

        let err = create_enterprise(
            Guard(admin),
            State(state),
            Json(CreateEnterpriseRequest {
                name: String::new(),
                location: None,
                contact_info: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn view_includes_attachment_counts() {
        let (state, _dir) = test_state();
        let admin = admin_identity(&state);

        let (_, Json(acme)) = create_enterprise(
            Guard(admin.clone()),
            State(state.clone()),
            Json(CreateEnterpriseRequest {
                name: "Acme".to_string(),
                location: Some("Berlin".to_string()),
                contact_info: None,
            }),
        )
        .await
        .unwrap();

        state
            .db
            .users()
            .create(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role_id: None,
                enterprise_id: Some(acme.id),
            })
            .unwrap();
        state
            .db
            .employees()
            .create(NewEmployee {
                name: "Dana".to_string(),
                department: None,
                role: None,
                salary: None,
                enterprise_id: acme.id,
            })
            .unwrap();

        let Json(view) = get_enterprise(Guard(admin), Path(acme.id), State(state))
            .await
            .unwrap();
        assert_eq!(view.user_count, 1);
        assert_eq!(view.employee_count, 1);
        assert_eq!(view.product_count, 0);
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let (state, _dir) = test_state();
        let admin = admin_identity(&state);

        create_enterprise(
            Guard(admin.clone()),
            State(state.clone()),
            Json(CreateEnterpriseRequest {
                name: "Acme".to_string(),
                location: None,
                contact_info: None,
            }),
        )
        .await
        .unwrap();

        let err = create_enterprise(
            Guard(admin),
            State(state),
            Json(CreateEnterpriseRequest {
                name: "ACME".to_string(),
                location: None,
                contact_info: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Enterprise name already exists");
    }

    #[tokio::test]
    async fn update_and_delete_roundtrip() {
        let (state, _dir) = test_state();
        let admin = admin_identity(&state);

        let (_, Json(acme)) = create_enterprise(
            Guard(admin.clone()),
            State(state.clone()),
            Json(CreateEnterpriseRequest {
                name: "Acme".to_string(),
                location: None,
                contact_info: None,
            }),
        )
        .await
        .unwrap();

        let Json(updated) = update_enterprise(
            Guard(admin.clone()),
            Path(acme.id),
            State(state.clone()),
            Json(UpdateEnterpriseRequest {
                location: Some("Hamburg".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Hamburg"));

        let status = delete_enterprise(Guard(admin.clone()), Path(acme.id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_enterprise(Guard(admin), Path(acme.id), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
