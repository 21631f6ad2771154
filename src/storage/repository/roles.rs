// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role and permission-grant repository.
//!
//! A role owns zero or more grant rows, keyed by (role_id, module) with
//! four independent action booleans. Creating or updating a role writes
//! the role record and its whole grant set inside one write transaction;
//! updates replace the grant set wholesale, so concurrent readers never
//! observe a role with a partially written permission set.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::{PermissionGrant, Role};
use crate::storage::{
    next_id, Database, StorageError, StorageResult, PERMISSIONS, ROLES, ROLES_BY_NAME,
};

/// Repository for role and permission-grant operations.
pub struct RoleRepository<'a> {
    db: &'a Database,
}

impl<'a> RoleRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a role together with its permission grants. Fails with
    /// `AlreadyExists` when the name is taken (case-insensitive).
    pub fn create(
        &self,
        name: &str,
        description: Option<String>,
        grants: &[PermissionGrant],
    ) -> StorageResult<Role> {
        let name_key = name.to_lowercase();

        let write_txn = self.db.begin_write()?;
        let role = {
            let mut by_name = write_txn.open_table(ROLES_BY_NAME)?;
            if by_name.get(name_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists("Role name".to_string()));
            }

            let id = next_id(&write_txn, "roles")?;
            let now = Utc::now();
            let role = Role {
                id,
                name: name.to_string(),
                description,
                created_at: now,
                updated_at: now,
            };

            let mut roles = write_txn.open_table(ROLES)?;
            roles.insert(id, serde_json::to_vec(&role)?.as_slice())?;
            by_name.insert(name_key.as_str(), id)?;

            let mut permissions = write_txn.open_table(PERMISSIONS)?;
            for grant in grants {
                permissions.insert(
                    (id, grant.module.as_str()),
                    serde_json::to_vec(grant)?.as_slice(),
                )?;
            }
            role
        };
        write_txn.commit()?;
        Ok(role)
    }

    /// Look up a role by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<Role>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLES)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a role by name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> StorageResult<Option<Role>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ROLES_BY_NAME)?;
        let id = match index.get(name.to_lowercase().as_str())? {
            Some(v) => v.value(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(ROLES)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All roles, newest first.
    pub fn list(&self) -> StorageResult<Vec<Role>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLES)?;
        let mut roles = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            roles.push(serde_json::from_slice::<Role>(value.value())?);
        }
        roles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(roles)
    }

    /// Update a role's name/description, and (when `grants` is given)
    /// replace its whole grant set. Everything happens in one write
    /// transaction, so no reader sees the window between old and new
    /// grants.
    pub fn update(
        &self,
        id: u64,
        name: Option<&str>,
        description: Option<String>,
        grants: Option<&[PermissionGrant]>,
    ) -> StorageResult<Role> {
        let write_txn = self.db.begin_write()?;
        let role = {
            let mut roles = write_txn.open_table(ROLES)?;
            let mut role: Role = {
                let existing = roles
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("Role".to_string()))?;
                serde_json::from_slice(existing.value())?
            };

            if let Some(new_name) = name {
                let old_key = role.name.to_lowercase();
                let new_key = new_name.to_lowercase();
                if old_key != new_key {
                    let mut by_name = write_txn.open_table(ROLES_BY_NAME)?;
                    if let Some(existing) = by_name.get(new_key.as_str())? {
                        if existing.value() != id {
                            return Err(StorageError::AlreadyExists("Role name".to_string()));
                        }
                    }
                    by_name.remove(old_key.as_str())?;
                    by_name.insert(new_key.as_str(), id)?;
                }
                role.name = new_name.to_string();
            }
            if let Some(desc) = description {
                role.description = Some(desc);
            }
            role.updated_at = Utc::now();
            roles.insert(id, serde_json::to_vec(&role)?.as_slice())?;

            if let Some(new_grants) = grants {
                let mut permissions = write_txn.open_table(PERMISSIONS)?;
                // Delete-then-reinsert, inside this same transaction.
                let existing_modules = modules_of(&permissions, id)?;
                for module in existing_modules {
                    permissions.remove((id, module.as_str()))?;
                }
                for grant in new_grants {
                    permissions.insert(
                        (id, grant.module.as_str()),
                        serde_json::to_vec(grant)?.as_slice(),
                    )?;
                }
            }
            role
        };
        write_txn.commit()?;
        Ok(role)
    }

    /// Delete a role and cascade-delete its grant rows. The caller is
    /// responsible for refusing deletion while users reference the role.
    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut roles = write_txn.open_table(ROLES)?;
            let role: Role = {
                let existing = roles
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("Role".to_string()))?;
                serde_json::from_slice(existing.value())?
            };
            roles.remove(id)?;

            let mut by_name = write_txn.open_table(ROLES_BY_NAME)?;
            by_name.remove(role.name.to_lowercase().as_str())?;

            let mut permissions = write_txn.open_table(PERMISSIONS)?;
            let modules = modules_of(&permissions, id)?;
            for module in modules {
                permissions.remove((id, module.as_str()))?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// The grant row for (role, module), if present.
    pub fn grant(&self, role_id: u64, module: &str) -> StorageResult<Option<PermissionGrant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PERMISSIONS)?;
        match table.get((role_id, module))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All grant rows for a role, as stored. Display paths filter out
    /// all-false rows via [`PermissionGrant::is_empty`].
    pub fn grants_for_role(&self, role_id: u64) -> StorageResult<Vec<PermissionGrant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PERMISSIONS)?;
        let mut grants = Vec::new();
        for entry in table.range((role_id, "")..)? {
            let (key, value) = entry?;
            if key.value().0 != role_id {
                break;
            }
            grants.push(serde_json::from_slice::<PermissionGrant>(value.value())?);
        }
        Ok(grants)
    }
}

/// Collect the module names of a role's existing grant rows.
fn modules_of(
    table: &impl ReadableTable<(u64, &'static str), &'static [u8]>,
    role_id: u64,
) -> StorageResult<Vec<String>> {
    let mut modules = Vec::new();
    for entry in table.range((role_id, "")..)? {
        let (key, _) = entry?;
        let (id, module) = key.value();
        if id != role_id {
            break;
        }
        modules.push(module.to_string());
    }
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn grant(module: &str, read: bool, create: bool, update: bool, delete: bool) -> PermissionGrant {
        PermissionGrant {
            module: module.to_string(),
            can_read: read,
            can_create: create,
            can_update: update,
            can_delete: delete,
        }
    }

    #[test]
    fn create_role_with_grants() {
        let (db, _dir) = temp_db();
        let repo = db.roles();

        let role = repo
            .create(
                "Manager",
                Some("Ops manager".to_string()),
                &[
                    grant("products", true, true, true, false),
                    grant("employees", true, false, false, false),
                ],
            )
            .unwrap();

        let loaded = repo.get(role.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Manager");

        let grants = repo.grants_for_role(role.id).unwrap();
        assert_eq!(grants.len(), 2);

        let products = repo.grant(role.id, "products").unwrap().unwrap();
        assert!(products.can_read && products.can_create && products.can_update);
        assert!(!products.can_delete);
    }

    #[test]
    fn duplicate_name_rejected_case_insensitively() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        repo.create("Manager", None, &[]).unwrap();

        let result = repo.create("manager", None, &[]);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn update_replaces_grant_set_wholesale() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        let role = repo
            .create(
                "Clerk",
                None,
                &[
                    grant("products", true, false, false, false),
                    grant("employees", true, false, false, false),
                ],
            )
            .unwrap();

        repo.update(
            role.id,
            None,
            None,
            Some(&[grant("users", true, true, false, false)]),
        )
        .unwrap();

        let grants = repo.grants_for_role(role.id).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].module, "users");
        assert!(repo.grant(role.id, "products").unwrap().is_none());
        assert!(repo.grant(role.id, "employees").unwrap().is_none());
    }

    #[test]
    fn update_without_grants_keeps_existing_set() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        let role = repo
            .create("Clerk", None, &[grant("products", true, false, false, false)])
            .unwrap();

        repo.update(role.id, Some("Senior Clerk"), None, None).unwrap();

        let loaded = repo.get(role.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Senior Clerk");
        assert_eq!(repo.grants_for_role(role.id).unwrap().len(), 1);
        assert!(repo.get_by_name("clerk").unwrap().is_none());
        assert!(repo.get_by_name("senior clerk").unwrap().is_some());
    }

    #[test]
    fn rename_conflict_rejected() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        repo.create("Manager", None, &[]).unwrap();
        let clerk = repo.create("Clerk", None, &[]).unwrap();

        let result = repo.update(clerk.id, Some("MANAGER"), None, None);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn delete_cascades_grants() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        let role = repo
            .create("Clerk", None, &[grant("products", true, false, false, false)])
            .unwrap();

        repo.delete(role.id).unwrap();
        assert!(repo.get(role.id).unwrap().is_none());
        assert!(repo.get_by_name("Clerk").unwrap().is_none());
        assert!(repo.grant(role.id, "products").unwrap().is_none());
    }

    #[test]
    fn grants_do_not_bleed_across_roles() {
        let (db, _dir) = temp_db();
        let repo = db.roles();
        let a = repo
            .create("A", None, &[grant("products", true, false, false, false)])
            .unwrap();
        let b = repo
            .create("B", None, &[grant("users", false, true, false, false)])
            .unwrap();

        let a_grants = repo.grants_for_role(a.id).unwrap();
        assert_eq!(a_grants.len(), 1);
        assert_eq!(a_grants[0].module, "products");

        let b_grants = repo.grants_for_role(b.id).unwrap();
        assert_eq!(b_grants.len(), 1);
        assert_eq!(b_grants[0].module, "users");
    }
}
