// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Resolvers talk to a [`Store`]; production uses Firestore, local runs and
//! tests use the in-process [`MemoryDb`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::models::{Flight, User, UserPatch};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Username reservations (document ID is the url-encoded username)
    pub const USERNAMES: &str = "usernames";
    pub const FLIGHTS: &str = "flights";
}

/// Errors surfaced by a store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A unique key (username) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Backend(String),
}

/// Direction of a follow-edge write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Link,
    Unlink,
}

/// User document operations.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Resolve a list of user IDs, keeping the input order.
    ///
    /// IDs without a document (e.g. deleted accounts) are skipped.
    async fn find_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, StoreError>;

    /// All users, oldest account first.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Conflict`] if the username
    /// is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Apply `patch` to the stored user, writing only the patched fields.
    /// Returns the record as stored afterwards.
    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, StoreError>;

    /// Change the username of `user` (already holding the new name), releasing
    /// `previous_username`. Only the username field is written.
    async fn rename_user(&self, user: &User, previous_username: &str) -> Result<(), StoreError>;

    /// Add or remove the edge `follower -> followee` on both records in one
    /// atomic write. Each side is an idempotent list operation on the stored
    /// record, so concurrent edges to the same user do not overwrite each other.
    async fn set_follow_edge(
        &self,
        follower_id: &str,
        followee_id: &str,
        change: EdgeChange,
    ) -> Result<(), StoreError>;

    /// Delete a user and release its username. Other users' graph lists are
    /// left untouched.
    async fn delete_user(&self, user: &User) -> Result<(), StoreError>;
}

/// Flight document operations.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// All flights, oldest entry first.
    async fn list_flights(&self) -> Result<Vec<Flight>, StoreError>;

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, StoreError>;

    async fn insert_flight(&self, flight: &Flight) -> Result<(), StoreError>;
}

/// Everything the API needs from a backend.
pub trait Store: UserStore + FlightStore {}

impl<T: UserStore + FlightStore> Store for T {}
