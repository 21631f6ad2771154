// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Module/action permission evaluation.
//!
//! The single place where the super-role is special-cased: every call
//! path shares this rule instead of re-checking role names at call sites.
//! For all other roles the decision is one grant-row lookup plus an
//! exhaustive match on the requested action.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;
use super::identity::Identity;
use crate::storage::Database;

/// Role name granted every permission on every module unconditionally.
pub const SUPER_ROLE: &str = "Admin";

/// The fixed set of protected resource groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Module {
    Dashboard,
    Users,
    Roles,
    Enterprises,
    Employees,
    Products,
}

impl Module {
    /// Every module, in display order.
    pub const ALL: [Module; 6] = [
        Module::Dashboard,
        Module::Users,
        Module::Roles,
        Module::Enterprises,
        Module::Employees,
        Module::Products,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Users => "users",
            Module::Roles => "roles",
            Module::Enterprises => "enterprises",
            Module::Employees => "employees",
            Module::Products => "products",
        }
    }

    /// Parse a module from its wire name.
    pub fn parse(s: &str) -> Option<Module> {
        match s {
            "dashboard" => Some(Module::Dashboard),
            "users" => Some(Module::Users),
            "roles" => Some(Module::Roles),
            "enterprises" => Some(Module::Enterprises),
            "employees" => Some(Module::Employees),
            "products" => Some(Module::Products),
            _ => None,
        }
    }

    /// Recover a module from its discriminant (used by the const-generic
    /// route guards).
    pub(crate) fn from_repr(value: u8) -> Option<Module> {
        Module::ALL.into_iter().find(|m| *m as u8 == value)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of actions a grant can permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub(crate) fn from_repr(value: u8) -> Option<Action> {
        [Action::Read, Action::Create, Action::Update, Action::Delete]
            .into_iter()
            .find(|a| *a as u8 == value)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether `identity` may perform `action` on `module`.
///
/// The super-role is allowed unconditionally, skipping the grant lookup
/// entirely. Everyone else needs a grant row for (role, module) with the
/// matching action boolean set.
pub fn check(
    db: &Database,
    identity: &Identity,
    module: Module,
    action: Action,
) -> Result<(), AuthError> {
    if identity.is_admin() {
        return Ok(());
    }

    let Some(role_id) = identity.role_id else {
        return Err(AuthError::NoModulePermissions);
    };

    let Some(grant) = db.roles().grant(role_id, module.as_str())? else {
        return Err(AuthError::NoModulePermissions);
    };

    let allowed = match action {
        Action::Read => grant.can_read,
        Action::Create => grant.can_create,
        Action::Update => grant.can_update,
        Action::Delete => grant.can_delete,
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied {
            module: module.as_str(),
            action: action.as_str(),
        })
    }
}
