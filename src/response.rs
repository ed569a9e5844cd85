// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Domain outcomes and the client-facing error taxonomy.
//!
//! Every resolver operation returns an [`Outcome`]: either its payload or a
//! single [`ResponseError`]. The GraphQL layer turns that into a response
//! object carrying payload fields *or* an `errors` list, never both.

use crate::config::Environment;
use std::fmt;

/// Result of a resolver operation.
pub type Outcome<T> = Result<T, ResponseError>;

/// Category reported in the `type` field of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/invalid token, or the caller does not own the target.
    Authorisation,
    /// Unknown or conflicting user/flight, social graph rule violations.
    User,
    /// Password too short or incorrect.
    Password,
    /// The store rejected a read or write.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authorisation => "authorisation error",
            Self::User => "user error",
            Self::Password => "password error",
            Self::Persistence => "persistence error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-facing messages.
pub mod messages {
    pub const NOT_AUTHORISED: &str = "Not authorised to carry out this action.";
    pub const NO_TOKEN: &str = "No valid token provided.";
    pub const INVALID_TOKEN: &str = "Invalid token provided.";
    pub const UNKNOWN_USERNAME: &str = "That username doesn't exist.";
    pub const MISSING_USER: &str = "User doesn't exist.";
    pub const USER_EXISTS: &str = "That username already exists.";
    pub const INCORRECT_PASSWORD: &str = "Incorrect password.";
    pub const INCORRECT_CURRENT_PASSWORD: &str = "Incorrect current password provided.";
    pub const ALREADY_FOLLOWING: &str = "Already following this user.";
    pub const NOT_FOLLOWING: &str = "Not following this user.";
    pub const MISSING_FOLLOWER: &str = "That user isn't following you.";
    pub const MISSING_FLIGHT: &str = "Flight doesn't exist.";
    pub const TOKEN_FAILURE: &str = "Could not issue a token.";
}

/// A `{type, message}` pair returned in a response's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ResponseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResponseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_authorised() -> Self {
        Self::new(ErrorKind::Authorisation, messages::NOT_AUTHORISED)
    }

    pub fn no_token() -> Self {
        Self::new(ErrorKind::Authorisation, messages::NO_TOKEN)
    }

    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::Authorisation, messages::INVALID_TOKEN)
    }

    pub fn unknown_username() -> Self {
        Self::new(ErrorKind::User, messages::UNKNOWN_USERNAME)
    }

    pub fn missing_user() -> Self {
        Self::new(ErrorKind::User, messages::MISSING_USER)
    }

    pub fn user_exists() -> Self {
        Self::new(ErrorKind::User, messages::USER_EXISTS)
    }

    pub fn password_too_short(min_length: usize) -> Self {
        Self::new(
            ErrorKind::Password,
            format!(
                "Password length is too short, minimum length is {} chars.",
                min_length
            ),
        )
    }

    pub fn new_password_too_short(min_length: usize) -> Self {
        Self::new(
            ErrorKind::Password,
            format!(
                "New password length is too short, minimum length is {} chars.",
                min_length
            ),
        )
    }

    pub fn incorrect_password() -> Self {
        Self::new(ErrorKind::Password, messages::INCORRECT_PASSWORD)
    }

    pub fn incorrect_current_password() -> Self {
        Self::new(ErrorKind::Password, messages::INCORRECT_CURRENT_PASSWORD)
    }

    pub fn already_following() -> Self {
        Self::new(ErrorKind::User, messages::ALREADY_FOLLOWING)
    }

    pub fn not_following() -> Self {
        Self::new(ErrorKind::User, messages::NOT_FOLLOWING)
    }

    pub fn missing_follower() -> Self {
        Self::new(ErrorKind::User, messages::MISSING_FOLLOWER)
    }

    pub fn missing_flight() -> Self {
        Self::new(ErrorKind::User, messages::MISSING_FLIGHT)
    }

    /// Convert a store or internal failure.
    ///
    /// Production responses get the generic `fallback` text; other
    /// environments see the underlying message. The failure is always logged.
    pub fn persistence(
        error: &dyn std::error::Error,
        environment: Environment,
        fallback: &str,
    ) -> Self {
        tracing::error!(error = %error, fallback, "Persistence failure");

        let message = if environment.is_production() {
            fallback.to_string()
        } else {
            error.to_string()
        };
        Self::new(ErrorKind::Persistence, message)
    }
}
