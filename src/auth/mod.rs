// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication and Authorization Module
//!
//! This module is the security core of the API: credential verification,
//! session-token issuance/validation, and per-module-per-action permission
//! evaluation.
//!
//! ## Request Flow
//!
//! 1. Client logs in with username/password and receives a signed token
//! 2. Client sends `Authorization: Bearer <token>` on every request
//! 3. The [`Auth`] extractor:
//!    - verifies the token signature and expiry (no storage access)
//!    - re-loads the user from storage, filtered to active accounts
//! 4. The [`Guard`] extractor additionally evaluates the handler's
//!    statically declared (module, action) pair against the role's
//!    permission grants, with the `Admin` super-role bypassing the lookup
//!
//! ## Security
//!
//! - Tokens are HS256-signed with a process-wide secret and a fixed TTL
//! - Token claims are never trusted for status/role currency: every
//!   request re-resolves the user, so a lockout or role change applies on
//!   the very next call
//! - Login failures never reveal whether the username or the password was
//!   wrong; account lockout is named at login time only
//! - No identity, token, or permission caching between requests

pub mod error;
pub mod extractor;
pub mod identity;
pub mod password;
pub mod permissions;
pub mod token;

pub use error::AuthError;
pub use extractor::{Auth, Guard};
pub use identity::Identity;
pub use permissions::{Action, Module, SUPER_ROLE};
pub use token::{extract_bearer, Claims, TokenService};
