// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL endpoint and the GraphiQL explorer.

use crate::graphql::AppSchema;
use crate::middleware::Caller;
use crate::AppState;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension,
};
use std::sync::Arc;

/// GraphiQL pulls its assets from unpkg.
const GRAPHIQL_CSP: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' https://unpkg.com; \
    style-src 'self' 'unsafe-inline' https://unpkg.com; \
    font-src 'self' data: https://unpkg.com; \
    img-src 'self' data:; \
    connect-src 'self'; \
    frame-ancestors 'none'";

/// Execute a GraphQL request on behalf of the resolved caller.
pub async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    Extension(caller): Extension<Caller>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();
    tracing::debug!(
        operation = request.operation_name.as_deref().unwrap_or("anonymous"),
        authenticated = caller.user().is_some(),
        "GraphQL request"
    );

    schema.execute(request.data(caller)).await.into()
}

/// Interactive explorer. Not served in production.
pub async fn graphiql(State(state): State<Arc<AppState>>) -> Response {
    if state.config.environment.is_production() {
        return StatusCode::NOT_FOUND.into_response();
    }

    (
        [(header::CONTENT_SECURITY_POLICY, GRAPHIQL_CSP)],
        Html(GraphiQLSource::build().endpoint("/graphql").finish()),
    )
        .into_response()
}
