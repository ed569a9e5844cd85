// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account lifecycle: registration, login, lookup, profile and credential
//! changes, deletion.
//!
//! Mutations require the caller to own the target account, meaning a
//! resolved caller whose username equals the target's. There is no admin
//! bypass.

use crate::config::{Config, Environment};
use crate::db::{Store, StoreError};
use crate::models::{ProfileUpdate, User, UserPatch};
use crate::response::{messages, ErrorKind, Outcome, ResponseError};
use crate::services::credentials::{CredentialError, Credentials};
use std::sync::Arc;

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// User identity operations.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    credentials: Credentials,
    min_password_length: usize,
    environment: Environment,
}

/// Caller must be present and own `target`.
fn authorise<'a>(caller: Option<&'a User>, target: Option<&User>) -> Outcome<&'a User> {
    match (caller, target) {
        (Some(caller), Some(target)) if caller.username == target.username => Ok(caller),
        _ => Err(ResponseError::not_authorised()),
    }
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, credentials: Credentials, config: &Config) -> Self {
        Self {
            store,
            credentials,
            min_password_length: config.min_password_length,
            environment: config.environment,
        }
    }

    fn store_failure(&self, error: StoreError, fallback: &str) -> ResponseError {
        ResponseError::persistence(&error, self.environment, fallback)
    }

    fn token_failure(&self, error: CredentialError) -> ResponseError {
        tracing::error!(error = %error, "Credential operation failed");
        ResponseError::new(ErrorKind::Authorisation, messages::TOKEN_FAILURE)
    }

    fn too_short(&self, password: &str) -> bool {
        password.chars().count() < self.min_password_length
    }

    async fn find_by_username(&self, username: &str) -> Outcome<Option<User>> {
        self.store
            .find_user_by_username(username)
            .await
            .map_err(|e| self.store_failure(e, "Could not fetch user."))
    }

    /// Every user. Not restricted to admins (no admin role exists).
    pub async fn get_all_users(&self) -> Outcome<Vec<User>> {
        self.store
            .list_users()
            .await
            .map_err(|e| self.store_failure(e, "Could not fetch users."))
    }

    pub async fn get_user(&self, username: &str) -> Outcome<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(ResponseError::unknown_username)
    }

    pub async fn who_am_i(&self, caller: Option<&User>) -> Outcome<User> {
        caller.cloned().ok_or_else(ResponseError::no_token)
    }

    /// Register a new account.
    ///
    /// The username check runs before the password check, so a taken
    /// username is reported even when the password is also too short.
    pub async fn create_user(&self, username: &str, password: &str) -> Outcome<User> {
        if self.find_by_username(username).await?.is_some() {
            return Err(ResponseError::user_exists());
        }

        if self.too_short(password) {
            return Err(ResponseError::password_too_short(self.min_password_length));
        }

        let password_hash = self
            .credentials
            .hash_password_blocking(password)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not create user."))?;
        let user = User::new(username, password_hash);

        match self.store.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, username, "Registered user");
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same name.
            Err(StoreError::Conflict(_)) => Err(ResponseError::user_exists()),
            Err(e) => Err(self.store_failure(e, "Could not create user.")),
        }
    }

    /// Verify credentials and issue a token. No user payload is returned.
    pub async fn login_user(&self, username: &str, password: &str) -> Outcome<String> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(ResponseError::unknown_username)?;

        let verified = self
            .credentials
            .verify_password_blocking(&user.password_hash, password)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not log in."))?;
        if !verified {
            tracing::info!(username, "Rejected login: incorrect password");
            return Err(ResponseError::incorrect_password());
        }

        let token = self
            .credentials
            .issue_token(&user)
            .map_err(|e| self.token_failure(e))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Update profile fields of `username`. Omitted fields are unchanged.
    pub async fn update_user(
        &self,
        username: &str,
        update: ProfileUpdate,
        caller: Option<&User>,
    ) -> Outcome<User> {
        let target = self.find_by_username(username).await?;
        authorise(caller, target.as_ref())?;
        let target = target.ok_or_else(ResponseError::not_authorised)?;

        let user = self
            .store
            .patch_user(&target.id, &UserPatch::Profile(update))
            .await
            .map_err(|e| self.store_failure(e, "Could not update user information."))?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Rename an account and issue a token bound to the new username.
    pub async fn update_username(
        &self,
        username: &str,
        new_username: &str,
        caller: Option<&User>,
    ) -> Outcome<Session> {
        let target = self.find_by_username(username).await?;
        authorise(caller, target.as_ref())?;
        let mut user = target.ok_or_else(ResponseError::not_authorised)?;

        if new_username != user.username {
            if let Some(existing) = self.find_by_username(new_username).await? {
                if existing.id != user.id {
                    return Err(ResponseError::user_exists());
                }
            }

            let previous = std::mem::replace(&mut user.username, new_username.to_string());
            match self.store.rename_user(&user, &previous).await {
                Ok(()) => {}
                Err(StoreError::Conflict(_)) => return Err(ResponseError::user_exists()),
                Err(e) => return Err(self.store_failure(e, "Could not update username.")),
            }

            tracing::info!(user_id = %user.id, from = %previous, to = new_username, "Username changed");

            // The rename only wrote the username; pick up current lists.
            if let Some(stored) = self
                .store
                .find_user_by_id(&user.id)
                .await
                .map_err(|e| self.store_failure(e, "Could not fetch user."))?
            {
                user = stored;
            }
        }

        let token = self
            .credentials
            .issue_token(&user)
            .map_err(|e| self.token_failure(e))?;

        Ok(Session { user, token })
    }

    /// Change the caller's password after verifying the current one.
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        caller: Option<&User>,
    ) -> Outcome<User> {
        let caller = caller.ok_or_else(ResponseError::not_authorised)?;

        let user = self
            .find_by_username(&caller.username)
            .await?
            .ok_or_else(ResponseError::invalid_token)?;

        let verified = self
            .credentials
            .verify_password_blocking(&user.password_hash, current_password)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not update password."))?;
        if !verified {
            return Err(ResponseError::incorrect_current_password());
        }

        if self.too_short(new_password) {
            return Err(ResponseError::new_password_too_short(
                self.min_password_length,
            ));
        }

        let password_hash = self
            .credentials
            .hash_password_blocking(new_password)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not update password."))?;

        let user = self
            .store
            .patch_user(&user.id, &UserPatch::PasswordHash(password_hash))
            .await
            .map_err(|e| self.store_failure(e, "Could not update password."))?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(user)
    }

    /// Delete an account, returning the record as it was before deletion.
    ///
    /// References to the account in other users' follow lists are left in
    /// place; list resolution skips them.
    pub async fn delete_user(&self, username: &str, caller: Option<&User>) -> Outcome<User> {
        if caller.is_none() {
            return Err(ResponseError::not_authorised());
        }

        let target = self
            .find_by_username(username)
            .await?
            .ok_or_else(ResponseError::missing_user)?;
        authorise(caller, Some(&target))?;

        self.store
            .delete_user(&target)
            .await
            .map_err(|e| self.store_failure(e, "Could not delete user."))?;

        tracing::info!(user_id = %target.id, "User deleted");
        Ok(target)
    }
}
