// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup and is immutable for the lifetime of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the embedded database file | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing key for session tokens | insecure dev default |
//! | `TOKEN_TTL_SECS` | Session token lifetime in seconds | `86400` (24h) |
//! | `ADMIN_PASSWORD` | Password for the seeded admin account | `admin` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::time::Duration;

/// Environment variable name for the data directory path.
///
/// The embedded database file (`enterprise.redb`) is created inside this
/// directory on first startup.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the session token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the session token lifetime (seconds).
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";

/// Environment variable name for the seeded admin account password.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Default session token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Signing key and token lifetime for the session token service.
///
/// Constructed once at startup and handed to [`crate::auth::TokenService`];
/// never re-read from the environment afterwards.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. The same key signs and verifies.
    pub secret: String,
    /// Fixed lifetime applied to every issued token.
    pub token_ttl: Duration,
}

/// Process-wide configuration, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub auth: AuthConfig,
    /// Password used when seeding the initial admin account.
    pub admin_password: String,
}

impl Config {
    /// Load configuration from the environment, applying defaults.
    ///
    /// Missing `JWT_SECRET` / `ADMIN_PASSWORD` fall back to insecure
    /// development defaults with a loud warning.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string());

        let secret = env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let token_ttl_secs: u64 = env::var(TOKEN_TTL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let admin_password = env::var(ADMIN_PASSWORD_ENV).unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; seeded admin uses insecure default");
            "admin".to_string()
        });

        Self {
            host,
            port,
            data_dir,
            auth: AuthConfig {
                secret,
                token_ttl: Duration::from_secs(token_ttl_secs),
            },
            admin_password,
        }
    }
}
