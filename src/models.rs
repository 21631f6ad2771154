// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the stored records and the request/response data
//! structures used by the REST API. All API-facing types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for automatic JSON handling and OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Users**: accounts that authenticate against the API
//! - **Roles / Permission Grants**: the RBAC vocabulary
//! - **Enterprises**: tenants scoping non-admin data visibility
//! - **Employees / Products**: tenant-owned business records
//!
//! The stored [`User`] record carries the password digest and therefore
//! never crosses the API boundary; handlers return [`UserView`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic confirmation body for operations with no data to return.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Account status. Only `active` accounts can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Locked,
}

impl UserStatus {
    /// Parse a status from its wire form (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "locked" => Some(UserStatus::Locked),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Locked => write!(f, "locked"),
        }
    }
}

/// Stored user record. Includes the password digest; storage-internal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Argon2id PHC-format digest. Stripped before any API response.
    pub password_hash: String,
    pub status: UserStatus,
    pub role_id: Option<u64>,
    pub enterprise_id: Option<u64>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as returned by the API: digest stripped, role and enterprise names
/// joined in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserView {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new user account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_id: Option<u64>,
    #[serde(default)]
    pub enterprise_id: Option<u64>,
}

/// Request to update an existing user. All fields optional; absent fields
/// are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<u64>,
    #[serde(default)]
    pub enterprise_id: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request to change a user's account status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    /// One of `active`, `inactive`, `locked`.
    pub status: String,
}

// =============================================================================
// Auth Models
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login response: the authenticated user plus a bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
}

/// Password reset request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

// =============================================================================
// Role / Permission Models
// =============================================================================

/// Stored role record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role's permitted actions on one module: four independent booleans.
///
/// A grant with all four booleans false is semantically "no access" and is
/// treated the same as an absent grant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PermissionGrant {
    pub module: String,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl PermissionGrant {
    /// True when no action is permitted; such grants are filtered from any
    /// surfaced permission list.
    pub fn is_empty(&self) -> bool {
        !self.can_read && !self.can_create && !self.can_update && !self.can_delete
    }
}

/// Role with its effective (non-empty) permission grants, as returned by
/// the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleView {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<PermissionGrant>,
}

/// Request to create a role together with its permission set.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionGrant>,
}

/// Request to update a role. When `permissions` is present the role's grant
/// set is replaced wholesale.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<PermissionGrant>>,
}

// =============================================================================
// Enterprise Models
// =============================================================================

/// Stored enterprise (tenant) record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Enterprise {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-form contact details (phone, email, website, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enterprise with attachment counts, as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnterpriseView {
    #[serde(flatten)]
    pub enterprise: Enterprise,
    pub user_count: u64,
    pub employee_count: u64,
    pub product_count: u64,
}

/// Request to create an enterprise.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEnterpriseRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_info: Option<serde_json::Value>,
}

/// Request to update an enterprise.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEnterpriseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_info: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Employee Models
// =============================================================================

/// Stored employee record, owned by one enterprise.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Job title, unrelated to RBAC roles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    pub status: String,
    pub enterprise_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee with the owning enterprise's name joined in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_name: Option<String>,
}

/// Request to create an employee.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    pub enterprise_id: u64,
}

/// Request to update an employee.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub enterprise_id: Option<u64>,
}

// =============================================================================
// Product Models
// =============================================================================

/// Stored product record, owned by one enterprise and optionally assigned
/// to an employee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Stock-keeping unit; unique across products when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub enterprise_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with enterprise and employee names joined in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
}

/// Request to create a product.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    pub enterprise_id: u64,
    #[serde(default)]
    pub employee_id: Option<u64>,
}

/// Request to update a product.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub enterprise_id: Option<u64>,
    #[serde(default)]
    pub employee_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_status_parses_case_insensitively() {
        assert_eq!(UserStatus::parse("active"), Some(UserStatus::Active));
        assert_eq!(UserStatus::parse("LOCKED"), Some(UserStatus::Locked));
        assert_eq!(UserStatus::parse("Inactive"), Some(UserStatus::Inactive));
        assert_eq!(UserStatus::parse("banned"), None);
    }

    #[test]
    fn user_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Locked).unwrap(),
            r#""locked""#
        );
    }

    #[test]
    fn empty_grant_is_detected() {
        let grant = PermissionGrant {
            module: "products".into(),
            can_read: false,
            can_create: false,
            can_update: false,
            can_delete: false,
        };
        assert!(grant.is_empty());

        let readable = PermissionGrant {
            can_read: true,
            ..grant
        };
        assert!(!readable.is_empty());
    }

    #[test]
    fn user_view_omits_absent_fields() {
        let view = UserView {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            status: UserStatus::Active,
            role_id: None,
            role_name: None,
            enterprise_id: None,
            enterprise_name: None,
            last_login: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("role_name").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
