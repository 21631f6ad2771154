// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee management endpoints.
//!
//! Listings are tenant-scoped: a non-admin identity attached to an
//! enterprise only sees that enterprise's employees. The permission gate
//! decides module/action; this row-level scope is applied here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{Action, Guard, Module};
use crate::error::ApiError;
use crate::models::{CreateEmployeeRequest, Employee, EmployeeView, UpdateEmployeeRequest};
use crate::state::AppState;
use crate::storage::NewEmployee;

use super::tenant_scope;

fn employee_view(state: &AppState, employee: Employee) -> Result<EmployeeView, ApiError> {
    let enterprise_name = state
        .db
        .enterprises()
        .get(employee.enterprise_id)?
        .map(|e| e.name);
    Ok(EmployeeView {
        employee,
        enterprise_name,
    })
}

/// List employees (scoped to the caller's enterprise for non-admins).
#[utoipa::path(
    get,
    path = "/v1/employees",
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employees visible to the caller", body = [EmployeeView]),
        (status = 403, description = "No read permission for employees"),
    )
)]
pub async fn list_employees(
    Guard(identity): Guard<{ Module::Employees as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeView>>, ApiError> {
    let employees = match tenant_scope(&identity) {
        Some(enterprise_id) => state.db.employees().list_by_enterprise(enterprise_id)?,
        None => state.db.employees().list()?,
    };
    let mut views = Vec::with_capacity(employees.len());
    for employee in employees {
        views.push(employee_view(&state, employee)?);
    }
    Ok(Json(views))
}

/// Get an employee by id.
#[utoipa::path(
    get,
    path = "/v1/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The employee", body = EmployeeView),
        (status = 404, description = "Employee not found"),
    )
)]
pub async fn get_employee(
    Guard(_identity): Guard<{ Module::Employees as u8 }, { Action::Read as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<EmployeeView>, ApiError> {
    let employee = state
        .db
        .employees()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;
    Ok(Json(employee_view(&state, employee)?))
}

/// List the employees of one enterprise.
#[utoipa::path(
    get,
    path = "/v1/employees/enterprise/{enterprise_id}",
    params(("enterprise_id" = u64, Path, description = "Enterprise id")),
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employees of the enterprise", body = [Employee]),
    )
)]
pub async fn list_employees_by_enterprise(
    Guard(_identity): Guard<{ Module::Employees as u8 }, { Action::Read as u8 }>,
    Path(enterprise_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(state.db.employees().list_by_enterprise(enterprise_id)?))
}

/// Create a new employee.
#[utoipa::path(
    post,
    path = "/v1/employees",
    request_body = CreateEmployeeRequest,
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing name or enterprise"),
        (status = 404, description = "Enterprise not found"),
    )
)]
pub async fn create_employee(
    Guard(_identity): Guard<{ Module::Employees as u8 }, { Action::Create as u8 }>,
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Employee name and enterprise ID are required",
        ));
    }
    if !state.db.enterprises().exists(request.enterprise_id)? {
        return Err(ApiError::not_found("Enterprise not found"));
    }

    let employee = state.db.employees().create(NewEmployee {
        name: request.name,
        department: request.department,
        role: request.role,
        salary: request.salary,
        enterprise_id: request.enterprise_id,
    })?;

    tracing::info!(employee_id = employee.id, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

/// Update an employee. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/v1/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    request_body = UpdateEmployeeRequest,
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
    )
)]
pub async fn update_employee(
    Guard(_identity): Guard<{ Module::Employees as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    let mut employee = state
        .db
        .employees()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    if let Some(name) = request.name {
        employee.name = name;
    }
    if let Some(department) = request.department {
        employee.department = Some(department);
    }
    if let Some(role) = request.role {
        employee.role = Some(role);
    }
    if let Some(salary) = request.salary {
        employee.salary = Some(salary);
    }
    if let Some(status) = request.status {
        employee.status = status;
    }
    if let Some(enterprise_id) = request.enterprise_id {
        if !state.db.enterprises().exists(enterprise_id)? {
            return Err(ApiError::not_found("Enterprise not found"));
        }
        employee.enterprise_id = enterprise_id;
    }

    state.db.employees().update(&employee)?;
    Ok(Json(employee))
}

/// Delete an employee.
#[utoipa::path(
    delete,
    path = "/v1/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
    )
)]
pub async fn delete_employee(
    Guard(_identity): Guard<{ Module::Employees as u8 }, { Action::Delete as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if !state.db.employees().exists(id)? {
        return Err(ApiError::not_found("Employee not found"));
    }
    state.db.employees().delete(id)?;
    tracing::info!(employee_id = id, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}
