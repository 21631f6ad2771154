// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! First-start provisioning.
//!
//! A fresh database has no accounts, so nobody could ever log in to
//! create one. On startup with an empty user table we seed the `Admin`
//! super-role (it needs no grant rows) and an `admin` account with the
//! configured password.

use crate::auth::{password, AuthError, SUPER_ROLE};
use crate::storage::{Database, NewUser, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("credential error: {0}")]
    Auth(#[from] AuthError),
}

/// Seed the default admin role and account when the user table is empty.
/// Idempotent: does nothing once any user exists.
pub fn ensure_default_admin(db: &Database, admin_password: &str) -> Result<(), BootstrapError> {
    if db.users().count(None)? > 0 {
        return Ok(());
    }

    let role = match db.roles().get_by_name(SUPER_ROLE)? {
        Some(role) => role,
        None => db.roles().create(
            SUPER_ROLE,
            Some("Full system administrator".to_string()),
            &[],
        )?,
    };

    let digest = password::hash(admin_password)?;
    let user = db.users().create(NewUser {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: digest,
        role_id: Some(role.id),
        enterprise_id: None,
    })?;

    tracing::info!(user_id = user.id, "seeded default admin account");
    Ok(())
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
    fn seeds_admin_role_and_account_once() {
        let (db, _dir) = temp_db();

        ensure_default_admin(&db, "first boot").unwrap();
        ensure_default_admin(&db, "different password").unwrap();

        let admin = db.users().get_by_username("admin").unwrap().unwrap();
        assert!(password::verify("first boot", &admin.password_hash).unwrap());

        let role = db.roles().get_by_name("Admin").unwrap().unwrap();
        assert_eq!(admin.role_id, Some(role.id));
        assert_eq!(db.users().count(None).unwrap(), 1);
    }

    #[test]
    fn skips_seeding_when_users_exist() {
        let (db, _dir) = temp_db();
        db.users()
            .create(NewUser {
                username: "existing".to_string(),
                email: "existing@example.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role_id: None,
                enterprise_id: None,
            })
            .unwrap();

        ensure_default_admin(&db, "whatever").unwrap();
        assert!(db.users().get_by_username("admin").unwrap().is_none());
    }
}
