// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier (also used as document ID)
    pub id: String,
    /// Unique login name
    pub username: String,
    /// PBKDF2 hash; never leaves the server
    pub password_hash: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    /// IDs of users this account follows, oldest first
    #[serde(default)]
    pub following: Vec<String>,
    /// IDs of users following this account, oldest first
    #[serde(default)]
    pub followers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user with an empty social graph.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            email_address: None,
            following: Vec::new(),
            followers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.following.iter().any(|id| id == user_id)
    }

    pub fn is_followed_by(&self, user_id: &str) -> bool {
        self.followers.iter().any(|id| id == user_id)
    }
}

/// Profile fields changed by `updateUser`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email_address {
            user.email_address = Some(email);
        }
        if let Some(first) = self.first_name {
            user.first_name = Some(first);
        }
        if let Some(last) = self.last_name {
            user.last_name = Some(last);
        }
    }
}

/// A field-level change to a stored user. Only the named fields are written,
/// so a concurrent follow never gets overwritten.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPatch {
    Profile(ProfileUpdate),
    PasswordHash(String),
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        match self {
            Self::Profile(update) => update.clone().apply(user),
            Self::PasswordHash(hash) => user.password_hash = hash.clone(),
        }
    }

    /// Document fields this patch writes. Empty for a profile update with
    /// nothing set.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::Profile(update) => [
                ("email_address", update.email_address.is_some()),
                ("first_name", update.first_name.is_some()),
                ("last_name", update.last_name.is_some()),
            ]
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect(),
            Self::PasswordHash(_) => vec!["password_hash"],
        }
    }
}

/// Append `id` unless it is already present.
pub(crate) fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

/// Remove every occurrence of `id`. Returns whether anything was removed.
pub(crate) fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}
