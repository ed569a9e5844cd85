// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Follow graph operations.
//!
//! An edge A -> B is recorded twice: B's id in A's `following` and A's id in
//! B's `followers`. Both sides are written in one atomic store call that
//! adds or removes the ids on the stored lists, so edges written at the same
//! time to the same user do not overwrite each other. The "already following"
//! check reads a snapshot; a duplicate follow racing past it is harmless
//! because adding an id is idempotent.

use crate::config::Environment;
use crate::db::{EdgeChange, Store};
use crate::models::User;
use crate::response::{Outcome, ResponseError};
use std::sync::Arc;

/// The records at both ends of a follow edge.
///
/// A user following themselves is a single record holding both sides.
#[derive(Debug, Clone)]
enum Edge {
    Loop(User),
    Pair { follower: User, followee: User },
}

impl Edge {
    fn new(follower: User, followee: User) -> Self {
        if follower.id == followee.id {
            Self::Loop(followee)
        } else {
            Self::Pair { follower, followee }
        }
    }

    fn recorded_by_followee(&self) -> bool {
        match self {
            Self::Loop(user) => user.is_followed_by(&user.id),
            Self::Pair { follower, followee } => followee.is_followed_by(&follower.id),
        }
    }

    fn recorded_by_follower(&self) -> bool {
        match self {
            Self::Loop(user) => user.is_following(&user.id),
            Self::Pair { follower, followee } => follower.is_following(&followee.id),
        }
    }

    /// `(follower_id, followee_id)`
    fn ids(&self) -> (&str, &str) {
        match self {
            Self::Loop(user) => (&user.id, &user.id),
            Self::Pair { follower, followee } => (&follower.id, &followee.id),
        }
    }
}

/// Social graph operations.
#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
    environment: Environment,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>, environment: Environment) -> Self {
        Self { store, environment }
    }

    /// Re-read the caller's record; the copy resolved from the token may be stale.
    async fn current(&self, caller: Option<&User>) -> Outcome<User> {
        let caller = caller.ok_or_else(ResponseError::not_authorised)?;

        self.store
            .find_user_by_id(&caller.id)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch user."))?
            .ok_or_else(ResponseError::missing_user)
    }

    async fn named(&self, username: &str) -> Outcome<User> {
        self.store
            .find_user_by_username(username)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch user."))?
            .ok_or_else(ResponseError::missing_user)
    }

    async fn resolve(&self, ids: &[String]) -> Outcome<Vec<User>> {
        self.store
            .find_users_by_ids(ids)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch users."))
    }

    /// Write both ends of the edge, then return the caller as stored.
    async fn persist(&self, edge: &Edge, change: EdgeChange, caller_id: &str) -> Outcome<User> {
        let (follower_id, followee_id) = edge.ids();
        self.store
            .set_follow_edge(follower_id, followee_id, change)
            .await
            .map_err(|e| {
                ResponseError::persistence(&e, self.environment, "Could not update followers.")
            })?;

        self.store
            .find_user_by_id(caller_id)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch user."))?
            .ok_or_else(ResponseError::missing_user)
    }

    /// Users following the caller, oldest edge first.
    pub async fn get_followers(&self, caller: Option<&User>) -> Outcome<Vec<User>> {
        let me = self.current(caller).await?;
        self.resolve(&me.followers).await
    }

    /// Users the caller follows, oldest edge first.
    pub async fn get_following(&self, caller: Option<&User>) -> Outcome<Vec<User>> {
        let me = self.current(caller).await?;
        self.resolve(&me.following).await
    }

    /// Make the caller follow `username`.
    ///
    /// Following yourself is allowed.
    pub async fn follow_user(&self, username: &str, caller: Option<&User>) -> Outcome<User> {
        let me = self.current(caller).await?;
        let target = self.named(username).await?;
        let caller_id = me.id.clone();

        let edge = Edge::new(me, target);
        if edge.recorded_by_followee() {
            return Err(ResponseError::already_following());
        }

        let updated = self.persist(&edge, EdgeChange::Link, &caller_id).await?;

        tracing::info!(follower = %caller_id, followee = username, "Follow edge created");
        Ok(updated)
    }

    /// Remove the caller's edge to `username`. A one-sided edge is repaired too.
    pub async fn unfollow_user(&self, username: &str, caller: Option<&User>) -> Outcome<User> {
        let me = self.current(caller).await?;
        let target = self.named(username).await?;
        let caller_id = me.id.clone();

        let edge = Edge::new(me, target);
        if !edge.recorded_by_followee() && !edge.recorded_by_follower() {
            return Err(ResponseError::not_following());
        }

        let updated = self.persist(&edge, EdgeChange::Unlink, &caller_id).await?;

        tracing::info!(follower = %caller_id, followee = username, "Follow edge removed");
        Ok(updated)
    }

    /// Remove `username` from the caller's followers.
    pub async fn remove_follower(&self, username: &str, caller: Option<&User>) -> Outcome<User> {
        let me = self.current(caller).await?;
        let follower = self.named(username).await?;
        let caller_id = me.id.clone();

        let edge = Edge::new(follower, me);
        if !edge.recorded_by_followee() && !edge.recorded_by_follower() {
            return Err(ResponseError::missing_follower());
        }

        let updated = self.persist(&edge, EdgeChange::Unlink, &caller_id).await?;

        tracing::info!(followee = %caller_id, follower = username, "Follower removed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_edge_ids() {
        let mut alice = User::new("alice", "h");
        let mut bob = User::new("bob", "h");
        alice.following.push(bob.id.clone());
        bob.followers.push(alice.id.clone());
        let (alice_id, bob_id) = (alice.id.clone(), bob.id.clone());

        let edge = Edge::new(alice, bob);
        assert!(edge.recorded_by_followee());
        assert!(edge.recorded_by_follower());
        assert_eq!(edge.ids(), (alice_id.as_str(), bob_id.as_str()));
    }

    #[test]
    fn test_self_edge_is_one_record() {
        let mut alice = User::new("alice", "h");
        let id = alice.id.clone();
        alice.followers.push(id.clone());

        let edge = Edge::new(alice.clone(), alice);
        assert!(matches!(edge, Edge::Loop(_)));
        assert!(edge.recorded_by_followee());
        assert!(!edge.recorded_by_follower());
        assert_eq!(edge.ids(), (id.as_str(), id.as_str()));
    }

    #[test]
    fn test_one_sided_edge_is_detected() {
        let mut alice = User::new("alice", "h");
        let bob = User::new("bob", "h");
        alice.following.push(bob.id.clone());

        let edge = Edge::new(alice, bob);
        assert!(edge.recorded_by_follower());
        assert!(!edge.recorded_by_followee());
    }
}
