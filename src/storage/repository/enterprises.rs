// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enterprise (tenant) repository.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::Enterprise;
use crate::storage::{
    next_id, Database, StorageError, StorageResult, ENTERPRISES, ENTERPRISES_BY_NAME,
};

/// Repository for enterprise operations.
pub struct EnterpriseRepository<'a> {
    db: &'a Database,
}

impl<'a> EnterpriseRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an enterprise. Fails with `AlreadyExists` when the name is
    /// taken (case-insensitive).
    pub fn create(
        &self,
        name: &str,
        location: Option<String>,
        contact_info: Option<serde_json::Value>,
    ) -> StorageResult<Enterprise> {
        let name_key = name.to_lowercase();

        let write_txn = self.db.begin_write()?;
        let enterprise = {
            let mut by_name = write_txn.open_table(ENTERPRISES_BY_NAME)?;
            if by_name.get(name_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists("Enterprise name".to_string()));
            }

            let id = next_id(&write_txn, "enterprises")?;
            let now = Utc::now();
            let enterprise = Enterprise {
                id,
                name: name.to_string(),
                location,
                contact_info,
                status: "active".to_string(),
                created_at: now,
                updated_at: now,
            };

            let mut table = write_txn.open_table(ENTERPRISES)?;
            table.insert(id, serde_json::to_vec(&enterprise)?.as_slice())?;
            by_name.insert(name_key.as_str(), id)?;
            enterprise
        };
        write_txn.commit()?;
        Ok(enterprise)
    }

    /// Look up an enterprise by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<Enterprise>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTERPRISES)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Whether an enterprise with this id exists.
    pub fn exists(&self, id: u64) -> StorageResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// All enterprises, newest first.
    pub fn list(&self) -> StorageResult<Vec<Enterprise>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTERPRISES)?;
        let mut enterprises = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            enterprises.push(serde_json::from_slice::<Enterprise>(value.value())?);
        }
        enterprises.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(enterprises)
    }

    /// Persist an updated enterprise, repairing the name index on rename.
    pub fn update(&self, enterprise: &Enterprise) -> StorageResult<()> {
        let mut enterprise = enterprise.clone();
        enterprise.updated_at = Utc::now();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTERPRISES)?;
            let old: Enterprise = {
                let existing = table
                    .get(enterprise.id)?
                    .ok_or_else(|| StorageError::NotFound("Enterprise".to_string()))?;
                serde_json::from_slice(existing.value())?
            };

            let old_key = old.name.to_lowercase();
            let new_key = enterprise.name.to_lowercase();
            if old_key != new_key {
                let mut by_name = write_txn.open_table(ENTERPRISES_BY_NAME)?;
                if let Some(existing) = by_name.get(new_key.as_str())? {
                    if existing.value() != enterprise.id {
                        return Err(StorageError::AlreadyExists("Enterprise name".to_string()));
                    }
                }
                by_name.remove(old_key.as_str())?;
                by_name.insert(new_key.as_str(), enterprise.id)?;
            }

            table.insert(enterprise.id, serde_json::to_vec(&enterprise)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete an enterprise and its name index entry.
    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTERPRISES)?;
            let enterprise: Enterprise = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("Enterprise".to_string()))?;
                serde_json::from_slice(existing.value())?
            };
            table.remove(id)?;

            let mut by_name = write_txn.open_table(ENTERPRISES_BY_NAME)?;
            by_name.remove(enterprise.name.to_lowercase().as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn create_get_and_list() {
        let (db, _dir) = temp_db();
        let repo = db.enterprises();

        let acme = repo
            .create("Acme", Some("Berlin".to_string()), None)
            .unwrap();
        repo.create("Globex", None, None).unwrap();

        assert!(repo.exists(acme.id).unwrap());
        assert_eq!(repo.list().unwrap().len(), 2);
        assert_eq!(repo.get(acme.id).unwrap().unwrap().name, "Acme");
    }

    #[test]
    fn duplicate_name_rejected() {
        let (db, _dir) = temp_db();
        let repo = db.enterprises();
        repo.create("Acme", None, None).unwrap();

        let result = repo.create("ACME", None, None);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn rename_updates_index() {
        let (db, _dir) = temp_db();
        let repo = db.enterprises();
        let mut acme = repo.create("Acme", None, None).unwrap();

        acme.name = "Acme Corp".to_string();
        repo.update(&acme).unwrap();

        // The old name becomes free again.
        repo.create("Acme", None, None).unwrap();
    }

    #[test]
    fn delete_frees_name() {
        let (db, _dir) = temp_db();
        let repo = db.enterprises();
        let acme = repo.create("Acme", None, None).unwrap();

        repo.delete(acme.id).unwrap();
        assert!(!repo.exists(acme.id).unwrap());
        repo.create("Acme", None, None).unwrap();
    }
}
