// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dashboard endpoints: entity counts and the caller's effective
//! permission map.
//!
//! Admins see global numbers; everyone else sees their own enterprise.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Action, Guard, Module};
use crate::error::ApiError;
use crate::models::Enterprise;
use crate::state::AppState;

/// Entity counts for dashboard widgets.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    pub users: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprises: Option<u64>,
    pub employees: u64,
    pub products: u64,
}

/// Dashboard payload. `enterprise` is present for tenant-scoped callers,
/// `message` when the caller has no enterprise assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<Enterprise>,
    pub stats: DashboardStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Action flags for one module in the permission map.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ModulePermissions {
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

const ALL_ALLOWED: ModulePermissions = ModulePermissions {
    can_read: true,
    can_create: true,
    can_update: true,
    can_delete: true,
};

/// Role- and tenant-aware dashboard data.
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    tag = "Dashboard",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 403, description = "No read permission for dashboard"),
    )
)]
pub async fn dashboard(
    Guard(identity): Guard<{ Module::Dashboard as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    if identity.is_admin() {
        return Ok(Json(DashboardResponse {
            enterprise: None,
            stats: DashboardStats {
                users: state.db.users().count(None)?,
                enterprises: Some(state.db.enterprises().list()?.len() as u64),
                employees: state.db.employees().count(None)?,
                products: state.db.products().count(None)?,
            },
            message: None,
        }));
    }

    match identity.enterprise_id {
        Some(enterprise_id) => {
            let enterprise = state.db.enterprises().get(enterprise_id)?;
            Ok(Json(DashboardResponse {
                enterprise,
                stats: DashboardStats {
                    users: state.db.users().count(Some(enterprise_id))?,
                    enterprises: None,
                    employees: state.db.employees().count(Some(enterprise_id))?,
                    products: state.db.products().count(Some(enterprise_id))?,
                },
                message: None,
            }))
        }
        None => Ok(Json(DashboardResponse {
            enterprise: None,
            stats: DashboardStats::default(),
            message: Some("No enterprise assigned".to_string()),
        })),
    }
}

/// The caller's effective permissions, keyed by module.
///
/// Admins get every module with all actions allowed; other roles get
/// their grant rows, with all-false rows omitted.
#[utoipa::path(
    get,
    path = "/v1/dashboard/permissions",
    tag = "Dashboard",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Effective permission map"),
        (status = 403, description = "No read permission for dashboard"),
    )
)]
pub async fn permissions(
    Guard(identity): Guard<{ Module::Dashboard as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, ModulePermissions>>, ApiError> {
    let mut map = BTreeMap::new();

    if identity.is_admin() {
        for module in Module::ALL {
            map.insert(module.as_str().to_string(), ALL_ALLOWED);
        }
        return Ok(Json(map));
    }

    if let Some(role_id) = identity.role_id {
        for grant in state.db.roles().grants_for_role(role_id)? {
            if grant.is_empty() {
                continue;
            }
            map.insert(
                grant.module.clone(),
                ModulePermissions {
                    can_read: grant.can_read,
                    can_create: grant.can_create,
                    can_update: grant.can_update,
                    can_delete: grant.can_delete,
                },
            );
        }
    }

    Ok(Json(map))
}
