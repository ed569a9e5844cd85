// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL schema.
//!
//! The schema is built once at startup by [`build_schema`] and handed to the
//! router. Resolvers find the [`AppState`] and the request's [`Caller`] in
//! the execution context.

pub mod flights;
pub mod loader;
pub mod social;
pub mod types;
pub mod users;

use crate::middleware::Caller;
use crate::models::User;
use crate::AppState;
use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, EmptySubscription, MergedObject, Schema};
use std::sync::Arc;

pub use loader::UserLoader;

/// Combined Query type
#[derive(MergedObject, Default)]
pub struct QueryRoot(users::UserQuery, social::SocialQuery, flights::FlightQuery);

/// Combined Mutation type
#[derive(MergedObject, Default)]
pub struct MutationRoot(
    users::UserMutation,
    social::SocialMutation,
    flights::FlightMutation,
);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around the shared state.
pub fn build_schema(state: Arc<AppState>) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(DataLoader::new(
            UserLoader::new(state.store.clone()),
            tokio::spawn,
        ))
        .data(state)
        .finish()
}

/// Shared state. Always present: [`build_schema`] installs it.
pub(crate) fn app<'a>(ctx: &Context<'a>) -> &'a AppState {
    ctx.data_unchecked::<Arc<AppState>>()
}

/// The resolved caller, if the request carried a valid token.
pub(crate) fn caller<'a>(ctx: &Context<'a>) -> Option<&'a User> {
    ctx.data_opt::<Caller>().and_then(Caller::user)
}
