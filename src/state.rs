// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AuthConfig;
use crate::storage::Database;

/// Shared application state.
///
/// The database handle and the token service are both read-only after
/// construction; there is no per-request mutable state and no caching of
/// identities or permissions between requests.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: Database, auth: &AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(TokenService::new(auth)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use super::*;
    use crate::storage::Database;

    /// Build an `AppState` over a throwaway database for handler tests.
    pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::open(&dir.path().join("test.redb")).expect("open db");
        let auth = AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
        };
        (AppState::new(db, &auth), dir)
    }
}
