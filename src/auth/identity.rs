// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolved identity for the current request.
//!
//! Resolution re-reads the user from storage on every request instead of
//! trusting the token's denormalized claims: a status or role change
//! takes effect on the very next request. The password digest is stripped
//! here and never reaches callers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;
use super::permissions::SUPER_ROLE;
use super::token::Claims;
use crate::models::{User, UserStatus};
use crate::storage::Database;

/// The authenticated actor for a request, freshly loaded from storage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Identity {
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
}

impl Identity {
    /// Whether this identity holds the super-role.
    pub fn is_admin(&self) -> bool {
        self.role_name.as_deref() == Some(SUPER_ROLE)
    }

    /// Build an identity from a stored user plus joined names. The stored
    /// record's digest stays behind.
    pub fn from_user(user: &User, role_name: Option<String>, enterprise_name: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            status: user.status,
            role_id: user.role_id,
            role_name,
            enterprise_id: user.enterprise_id,
            enterprise_name,
        }
    }
}

/// Resolve verified token claims to a live identity.
///
/// One read-only lookup per call, filtered to `active` accounts: a user
/// whose row exists but is inactive or locked resolves to the same error
/// as a missing user.
pub fn resolve(db: &Database, claims: &Claims) -> Result<Identity, AuthError> {
    let user_id = claims.user_id().ok_or(AuthError::UserNotFoundOrInactive)?;

    let user = db
        .users()
        .get(user_id)?
        .ok_or(AuthError::UserNotFoundOrInactive)?;

    if user.status != UserStatus::Active {
        return Err(AuthError::UserNotFoundOrInactive);
    }

    let role_name = match user.role_id {
        Some(role_id) => db.roles().get(role_id)?.map(|r| r.name),
        None => None,
    };
    let enterprise_name = match user.enterprise_id {
        Some(enterprise_id) => db.enterprises().get(enterprise_id)?.map(|e| e.name),
        None => None,
    };

    Ok(Identity::from_user(&user, role_name, enterprise_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NewUser;

    fn temp_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn claims_for(user: &User) -> Claims {
        Claims {
            sub: user.id.to_string(),
            role_id: user.role_id,
            enterprise_id: user.enterprise_id,
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn create_user(db: &Database, role_id: Option<u64>, enterprise_id: Option<u64>) -> User {
        db.users()
            .create(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role_id,
                enterprise_id,
            })
            .unwrap()
    }

    #[test]
    fn resolves_active_user_with_joined_names() {
        let (db, _dir) = temp_db();
        let role = db.roles().create("Manager", None, &[]).unwrap();
        let enterprise = db.enterprises().create("Acme", None, None).unwrap();
        let user = create_user(&db, Some(role.id), Some(enterprise.id));

        let identity = resolve(&db, &claims_for(&user)).unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role_name.as_deref(), Some("Manager"));
        assert_eq!(identity.enterprise_name.as_deref(), Some("Acme"));
        assert!(!identity.is_admin());
    }

    #[test]
    fn inactive_user_is_rejected_despite_valid_claims() {
        let (db, _dir) = temp_db();
        let user = create_user(&db, None, None);
        db.users().set_status(user.id, UserStatus::Inactive).unwrap();

        let result = resolve(&db, &claims_for(&user));
        assert!(matches!(result, Err(AuthError::UserNotFoundOrInactive)));
    }

    #[test]
    fn locked_user_is_rejected_despite_valid_claims() {
        let (db, _dir) = temp_db();
        let user = create_user(&db, None, None);
        db.users().set_status(user.id, UserStatus::Locked).unwrap();

        let result = resolve(&db, &claims_for(&user));
        assert!(matches!(result, Err(AuthError::UserNotFoundOrInactive)));
    }

    #[test]
    fn missing_user_is_rejected() {
        let (db, _dir) = temp_db();
        let claims = Claims {
            sub: "999".to_string(),
            role_id: None,
            enterprise_id: None,
            iat: 0,
            exp: i64::MAX,
        };
        assert!(matches!(
            resolve(&db, &claims),
            Err(AuthError::UserNotFoundOrInactive)
        ));
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let (db, _dir) = temp_db();
        let claims = Claims {
            sub: "not-a-number".to_string(),
            role_id: None,
            enterprise_id: None,
            iat: 0,
            exp: i64::MAX,
        };
        assert!(matches!(
            resolve(&db, &claims),
            Err(AuthError::UserNotFoundOrInactive)
        ));
    }

    #[test]
    fn role_change_in_storage_wins_over_token_claims() {
        let (db, _dir) = temp_db();
        let old_role = db.roles().create("Manager", None, &[]).unwrap();
        let new_role = db.roles().create("Clerk", None, &[]).unwrap();
        let mut user = create_user(&db, Some(old_role.id), None);

        // Claims still carry the old role id.
        let claims = claims_for(&user);

        user.role_id = Some(new_role.id);
        db.users().update(&user).unwrap();

        let identity = resolve(&db, &claims).unwrap();
        assert_eq!(identity.role_id, Some(new_role.id));
        assert_eq!(identity.role_name.as_deref(), Some("Clerk"));
    }

    #[test]
    fn admin_detection_uses_current_role_name() {
        let (db, _dir) = temp_db();
        let role = db.roles().create("Admin", None, &[]).unwrap();
        let user = create_user(&db, Some(role.id), None);

        let identity = resolve(&db, &claims_for(&user)).unwrap();
        assert!(identity.is_admin());
    }
}
