// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batched user lookups for resolving `following`, `followers` and
//! `createdBy` references.

use crate::db::{Store, StoreError};
use crate::models::User;
use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;

/// DataLoader for fetching users by ID.
pub struct UserLoader {
    store: Arc<dyn Store>,
}

impl UserLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<String> for UserLoader {
    type Value = User;
    type Error = StoreError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let users = self.store.find_users_by_ids(keys).await?;
        tracing::debug!(requested = keys.len(), found = users.len(), "Batched user load");

        Ok(users.into_iter().map(|user| (user.id.clone(), user)).collect())
    }
}
