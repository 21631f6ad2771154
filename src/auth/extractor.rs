// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors forming the two-stage authorization pipeline.
//!
//! Use the `Auth` extractor in handlers that only need authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is the resolved Identity
//! }
//! ```
//!
//! Use `Guard` for handlers protected by a module/action permission. The
//! module and action are declared statically per handler via const
//! generics, so the route table documents its own requirements:
//!
//! ```rust,ignore
//! async fn delete_product(
//!     Guard(identity): Guard<{ Module::Products as u8 }, { Action::Delete as u8 }>,
//! ) -> impl IntoResponse {
//!     // only reached when authentication AND authorization passed
//! }
//! ```
//!
//! Stage 1 (authenticate) short-circuits with 401 before the handler runs;
//! stage 2 (authorize) short-circuits with 403. Nothing is cached between
//! requests: both stages hit storage fresh on every call.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AuthError;
use super::identity::{resolve, Identity};
use super::permissions::{check, Action, Module};
use super::token::extract_bearer;
use crate::state::AppState;

/// Extractor for authenticated requests (stage 1 only).
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // An identity already placed in extensions wins (test injection,
        // or upstream middleware).
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        let token = extract_bearer(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.tokens.verify(token)?;
        let identity = resolve(&state.db, &claims)?;

        Ok(Auth(identity))
    }
}

/// Extractor for permission-guarded requests (stages 1 and 2).
///
/// `M` and `A` are the discriminants of [`Module`] and [`Action`]; write
/// them as `{ Module::Products as u8 }` / `{ Action::Delete as u8 }`.
pub struct Guard<const M: u8, const A: u8>(pub Identity);

impl<const M: u8, const A: u8> FromRequestParts<AppState> for Guard<M, A> {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(identity) = Auth::from_request_parts(parts, state).await?;

        let module = Module::from_repr(M).ok_or(AuthError::UnsupportedAction)?;
        let action = Action::from_repr(A).ok_or(AuthError::UnsupportedAction)?;
        check(&state.db, &identity, module, action)?;

        Ok(Guard(identity))
    }
}
