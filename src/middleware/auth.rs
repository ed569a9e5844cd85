// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller resolution middleware.
//!
//! Every request gets a [`Caller`] extension. Requests without a usable token
//! are anonymous rather than rejected; resolvers decide what needs a caller.

use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Session cookie holding the bearer token.
pub const SESSION_COOKIE: &str = "skylog_token";

/// The user making the request, if any.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<User>);

impl Caller {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Token from the `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller for `token`.
///
/// The token must verify, name an existing user, and carry that user's
/// current username. A token issued before a rename no longer matches.
pub async fn resolve_token(state: &AppState, token: &str) -> Option<User> {
    let claims = match state.credentials.verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid token");
            return None;
        }
    };

    let user = match state.store.find_user_by_id(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load token subject");
            return None;
        }
    };

    if user.username != claims.username {
        tracing::debug!(user_id = %user.id, "Token username is stale");
        return None;
    }

    Some(user)
}

/// Middleware that attaches the resolved [`Caller`] to the request.
pub async fn resolve_caller(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(request.headers()).map(str::to_string));

    let caller = match token {
        Some(token) => Caller(resolve_token(&state, &token).await),
        None => Caller(None),
    };

    request.extensions_mut().insert(caller);
    next.run(request).await
}
