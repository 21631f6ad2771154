// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Embedded storage backed by redb (pure Rust, ACID). One [`Database`]
//! handle is shared across the application; repositories borrow it and
//! expose typed operations per table family.
//!
//! ## Table Layout
//!
//! - `users`: id → serialized User; secondary indexes `users_by_username`
//!   and `users_by_email` (lowercased keys, enforced unique)
//! - `roles`: id → serialized Role; index `roles_by_name`
//! - `permissions`: composite key (role_id, module) → serialized grant bits
//! - `enterprises`: id → serialized Enterprise; index `enterprises_by_name`
//! - `employees`: id → serialized Employee
//! - `products`: id → serialized Product; index `products_by_sku`
//! - `sequences`: table name → next id
//!
//! Rows are stored as JSON bytes. Multi-row writes (user + its indexes,
//! role + its grant set) happen inside a single write transaction, so
//! readers never observe a half-applied update.

use std::path::Path;

use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

pub mod repository;

pub use repository::{
    EmployeeRepository, EnterpriseRepository, NewEmployee, NewProduct, NewUser, ProductRepository,
    RoleRepository, UserRepository,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary user table: id → serialized User (JSON bytes).
pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: lowercased username → user id.
pub(crate) const USERS_BY_USERNAME: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_username");

/// Unique index: lowercased email → user id.
pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_email");

/// Primary role table: id → serialized Role (JSON bytes).
pub(crate) const ROLES: TableDefinition<u64, &[u8]> = TableDefinition::new("roles");

/// Unique index: lowercased role name → role id.
pub(crate) const ROLES_BY_NAME: TableDefinition<&str, u64> =
    TableDefinition::new("roles_by_name");

/// Permission grants: (role_id, module) → serialized grant booleans.
pub(crate) const PERMISSIONS: TableDefinition<(u64, &str), &[u8]> =
    TableDefinition::new("permissions");

/// Primary enterprise table: id → serialized Enterprise (JSON bytes).
pub(crate) const ENTERPRISES: TableDefinition<u64, &[u8]> = TableDefinition::new("enterprises");

/// Unique index: lowercased enterprise name → enterprise id.
pub(crate) const ENTERPRISES_BY_NAME: TableDefinition<&str, u64> =
    TableDefinition::new("enterprises_by_name");

/// Primary employee table: id → serialized Employee (JSON bytes).
pub(crate) const EMPLOYEES: TableDefinition<u64, &[u8]> = TableDefinition::new("employees");

/// Primary product table: id → serialized Product (JSON bytes).
pub(crate) const PRODUCTS: TableDefinition<u64, &[u8]> = TableDefinition::new("products");

/// Unique index: SKU → product id.
pub(crate) const PRODUCTS_BY_SKU: TableDefinition<&str, u64> =
    TableDefinition::new("products_by_sku");

/// Id sequences: table name → next id to hand out.
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the embedded database.
///
/// redb supports one writer and any number of concurrent readers, so this
/// handle is shared as-is (no outer lock) via `Arc` in application state.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_USERNAME)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(ROLES)?;
            let _ = write_txn.open_table(ROLES_BY_NAME)?;
            let _ = write_txn.open_table(PERMISSIONS)?;
            let _ = write_txn.open_table(ENTERPRISES)?;
            let _ = write_txn.open_table(ENTERPRISES_BY_NAME)?;
            let _ = write_txn.open_table(EMPLOYEES)?;
            let _ = write_txn.open_table(PRODUCTS)?;
            let _ = write_txn.open_table(PRODUCTS_BY_SKU)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> StorageResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Users repository view over this database.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    /// Roles (and permission grants) repository view.
    pub fn roles(&self) -> RoleRepository<'_> {
        RoleRepository::new(self)
    }

    /// Enterprises repository view.
    pub fn enterprises(&self) -> EnterpriseRepository<'_> {
        EnterpriseRepository::new(self)
    }

    /// Employees repository view.
    pub fn employees(&self) -> EmployeeRepository<'_> {
        EmployeeRepository::new(self)
    }

    /// Products repository view.
    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self)
    }
}

/// Allocate the next id from the named sequence, inside the given write
/// transaction. Ids start at 1.
pub(crate) fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let next = match table.get(sequence)? {
        Some(v) => v.value(),
        None => 1,
    };
    table.insert(sequence, next + 1)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_tables_and_sequences_start_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();

        let write_txn = db.begin_write().unwrap();
        let first = next_id(&write_txn, "users").unwrap();
        let second = next_id(&write_txn, "users").unwrap();
        let other = next_id(&write_txn, "roles").unwrap();
        write_txn.commit().unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(other, 1);
    }

    #[test]
    fn reopen_preserves_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.redb");

        {
            let db = Database::open(&path).unwrap();
            let write_txn = db.begin_write().unwrap();
            next_id(&write_txn, "users").unwrap();
            write_txn.commit().unwrap();
        }

        let db = Database::open(&path).unwrap();
        let write_txn = db.begin_write().unwrap();
        let id = next_id(&write_txn, "users").unwrap();
        write_txn.commit().unwrap();
        assert_eq!(id, 2);
    }
}
