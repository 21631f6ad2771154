// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides CRUD operations for a specific entity type.
//! Writes that span multiple tables (a record plus its indexes, a role
//! plus its grant rows) run inside one write transaction.

pub mod employees;
pub mod enterprises;
pub mod products;
pub mod roles;
pub mod users;

pub use employees::{EmployeeRepository, NewEmployee};
pub use enterprises::EnterpriseRepository;
pub use products::{NewProduct, ProductRepository};
pub use roles::RoleRepository;
pub use users::{NewUser, UserRepository};
