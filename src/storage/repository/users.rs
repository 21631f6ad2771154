// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are stored by numeric id with unique secondary indexes on
//! username and email (both matched case-insensitively). The password
//! digest lives only in the stored record; API-facing views are built by
//! the handlers and never include it.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::{User, UserStatus};
use crate::storage::{
    next_id, Database, StorageError, StorageResult, USERS, USERS_BY_EMAIL, USERS_BY_USERNAME,
};

/// Fields accepted when creating a user. The password arrives pre-hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<u64>,
    pub enterprise_id: Option<u64>,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new user. Fails with `AlreadyExists` when the username or
    /// email is taken. The record and both indexes are written atomically.
    pub fn create(&self, new: NewUser) -> StorageResult<User> {
        let username_key = new.username.to_lowercase();
        let email_key = new.email.to_lowercase();

        let write_txn = self.db.begin_write()?;
        let user = {
            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            if by_username.get(username_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists("Username".to_string()));
            }
            if by_email.get(email_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists("Email".to_string()));
            }

            let id = next_id(&write_txn, "users")?;
            let now = Utc::now();
            let user = User {
                id,
                username: new.username,
                email: new.email,
                password_hash: new.password_hash,
                status: UserStatus::Active,
                role_id: new.role_id,
                enterprise_id: new.enterprise_id,
                last_login: None,
                created_at: now,
                updated_at: now,
            };

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, serde_json::to_vec(&user)?.as_slice())?;
            by_username.insert(username_key.as_str(), id)?;
            by_email.insert(email_key.as_str(), id)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Look up a user by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by username (case-insensitive).
    pub fn get_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERS_BY_USERNAME)?;
        let id = match index.get(username.to_lowercase().as_str())? {
            Some(v) => v.value(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email (case-insensitive).
    pub fn get_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERS_BY_EMAIL)?;
        let id = match index.get(email.to_lowercase().as_str())? {
            Some(v) => v.value(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All users, newest first.
    pub fn list(&self) -> StorageResult<Vec<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            users.push(serde_json::from_slice::<User>(value.value())?);
        }
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Users belonging to one enterprise, newest first.
    pub fn list_by_enterprise(&self, enterprise_id: u64) -> StorageResult<Vec<User>> {
        let mut users = self.list()?;
        users.retain(|u| u.enterprise_id == Some(enterprise_id));
        Ok(users)
    }

    /// Persist an updated user record, repairing the username/email indexes
    /// when those fields changed. Fails with `AlreadyExists` if the new
    /// username or email belongs to a different user.
    pub fn update(&self, user: &User) -> StorageResult<()> {
        let mut user = user.clone();
        user.updated_at = Utc::now();

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let old: User = {
                let existing = users
                    .get(user.id)?
                    .ok_or_else(|| StorageError::NotFound("User".to_string()))?;
                serde_json::from_slice(existing.value())?
            };

            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            let old_username = old.username.to_lowercase();
            let new_username = user.username.to_lowercase();
            if old_username != new_username {
                if let Some(existing) = by_username.get(new_username.as_str())? {
                    if existing.value() != user.id {
                        return Err(StorageError::AlreadyExists("Username".to_string()));
                    }
                }
                by_username.remove(old_username.as_str())?;
                by_username.insert(new_username.as_str(), user.id)?;
            }

            let old_email = old.email.to_lowercase();
            let new_email = user.email.to_lowercase();
            if old_email != new_email {
                if let Some(existing) = by_email.get(new_email.as_str())? {
                    if existing.value() != user.id {
                        return Err(StorageError::AlreadyExists("Email".to_string()));
                    }
                }
                by_email.remove(old_email.as_str())?;
                by_email.insert(new_email.as_str(), user.id)?;
            }

            users.insert(user.id, serde_json::to_vec(&user)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete a user and its index entries.
    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let user: User = {
                let existing = users
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("User".to_string()))?;
                serde_json::from_slice(existing.value())?
            };
            users.remove(id)?;

            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;
            by_username.remove(user.username.to_lowercase().as_str())?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            by_email.remove(user.email.to_lowercase().as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Change a user's account status.
    pub fn set_status(&self, id: u64, status: UserStatus) -> StorageResult<()> {
        self.mutate(id, |user| user.status = status)
    }

    /// Record a successful login. A side effect of the login flow, not of
    /// authorization itself.
    pub fn record_login(&self, id: u64) -> StorageResult<()> {
        self.mutate(id, |user| user.last_login = Some(Utc::now()))
    }

    /// Overwrite a user's password digest.
    pub fn set_password(&self, id: u64, password_hash: String) -> StorageResult<()> {
        self.mutate(id, |user| user.password_hash = password_hash)
    }

    /// Whether any user references the given role. Used to guard role
    /// deletion.
    pub fn any_with_role(&self, role_id: u64) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let user: User = serde_json::from_slice(value.value())?;
            if user.role_id == Some(role_id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Total user count, optionally scoped to one enterprise.
    pub fn count(&self, enterprise_id: Option<u64>) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            match enterprise_id {
                None => count += 1,
                Some(eid) => {
                    let user: User = serde_json::from_slice(value.value())?;
                    if user.enterprise_id == Some(eid) {
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }

    fn mutate(&self, id: u64, apply: impl FnOnce(&mut User)) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut user: User = {
                let existing = users
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("User".to_string()))?;
                serde_json::from_slice(existing.value())?
            };
            apply(&mut user);
            user.updated_at = Utc::now();
            users.insert(id, serde_json::to_vec(&user)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
