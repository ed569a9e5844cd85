// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Used for local development (`STORE_BACKEND=memory`) and by the test
//! suite. Writes are serialised by a single async lock; reads go straight to
//! the maps. Write failures can be injected to exercise error paths.

use crate::db::{EdgeChange, FlightStore, StoreError, UserStore};
use crate::models::user::{push_unique, remove_id};
use crate::models::{Flight, User, UserPatch};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// In-memory database.
#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    /// username -> user ID
    usernames: DashMap<String, String>,
    flights: DashMap<String, Flight>,
    write_lock: Mutex<()>,
    failing_ids: DashSet<String>,
    fail_all_writes: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write touching document `id` fail until cleared.
    pub fn fail_writes_for(&self, id: &str) {
        self.failing_ids.insert(id.to_string());
    }

    /// Make every write fail until cleared.
    pub fn fail_all_writes(&self) {
        self.fail_all_writes.store(true, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        self.failing_ids.clear();
        self.fail_all_writes.store(false, Ordering::SeqCst);
    }

    fn check_writable(&self, id: &str) -> Result<(), StoreError> {
        if self.fail_all_writes.load(Ordering::SeqCst) || self.failing_ids.contains(id) {
            return Err(StoreError::Backend(format!(
                "injected write failure for document {}",
                id
            )));
        }
        Ok(())
    }

    fn claim_username(&self, username: &str, user_id: &str) -> Result<(), StoreError> {
        match self.usernames.get(username) {
            Some(owner) if owner.value() != user_id => Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                username
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|user| user.value().clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let id = match self.usernames.get(username) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        self.find_user_by_id(&id).await
    }

    async fn find_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|user| user.value().clone()))
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_writable(&user.id)?;

        if self.usernames.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        self.usernames.insert(user.username.clone(), user.id.clone());
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_writable(id)?;

        let mut entry = self
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn rename_user(&self, user: &User, previous_username: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_writable(&user.id)?;
        self.claim_username(&user.username, &user.id)?;

        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
        stored.username = user.username.clone();
        drop(stored);

        self.usernames.remove(previous_username);
        self.usernames.insert(user.username.clone(), user.id.clone());
        Ok(())
    }

    async fn set_follow_edge(
        &self,
        follower_id: &str,
        followee_id: &str,
        change: EdgeChange,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        // Validate both sides before touching either.
        for id in [follower_id, followee_id] {
            self.check_writable(id)?;
            if !self.users.contains_key(id) {
                return Err(StoreError::NotFound(format!("user {}", id)));
            }
        }

        // Separate guards: follower and followee may be the same entry.
        if let Some(mut follower) = self.users.get_mut(follower_id) {
            match change {
                EdgeChange::Link => push_unique(&mut follower.following, followee_id),
                EdgeChange::Unlink => {
                    remove_id(&mut follower.following, followee_id);
                }
            }
        }
        if let Some(mut followee) = self.users.get_mut(followee_id) {
            match change {
                EdgeChange::Link => push_unique(&mut followee.followers, follower_id),
                EdgeChange::Unlink => {
                    remove_id(&mut followee.followers, follower_id);
                }
            }
        }
        Ok(())
    }

    async fn delete_user(&self, user: &User) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_writable(&user.id)?;

        if self.users.remove(&user.id).is_none() {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        self.usernames
            .remove_if(&user.username, |_, owner| owner == &user.id);
        Ok(())
    }
}

#[async_trait]
impl FlightStore for MemoryDb {
    async fn list_flights(&self) -> Result<Vec<Flight>, StoreError> {
        let mut flights: Vec<Flight> = self
            .flights
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        flights.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(flights)
    }

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, StoreError> {
        Ok(self.flights.get(id).map(|flight| flight.value().clone()))
    }

    async fn insert_flight(&self, flight: &Flight) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_writable(&flight.id)?;
        self.flights.insert(flight.id.clone(), flight.clone());
        Ok(())
    }
}
