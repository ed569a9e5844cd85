// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Skylog: user accounts, a follow graph and a flight log behind a GraphQL API.
//!
//! This crate provides the backend API. Resolvers are thin wrappers around
//! the services in [`services`], which talk to a document [`db::Store`].

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{Credentials, FlightService, SocialService, UserService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub credentials: Credentials,
    pub users: UserService,
    pub social: SocialService,
    pub flights: FlightService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let credentials = Credentials::new(&config);

        Self {
            users: UserService::new(store.clone(), credentials.clone(), &config),
            social: SocialService::new(store.clone(), config.environment),
            flights: FlightService::new(store.clone(), config.environment),
            credentials,
            store,
            config,
        }
    }
}
