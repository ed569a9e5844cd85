// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL object, input and response types.
//!
//! Response types only come from an [`Outcome`], so a response carries either
//! its payload fields or `errors`, never both.

use crate::graphql::loader::UserLoader;
use crate::models::{Flight, ProfileUpdate, User};
use crate::response::{Outcome, ResponseError};
use crate::services::Session;
use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

/// Resolve user IDs through the loader, keeping order and skipping IDs with
/// no record.
async fn load_users(ctx: &Context<'_>, ids: &[String]) -> Result<Vec<UserObject>> {
    let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
    let mut found = loader.load_many(ids.iter().cloned()).await?;

    Ok(ids
        .iter()
        .filter_map(|id| found.remove(id))
        .map(UserObject)
        .collect())
}

/// A user as exposed to clients. The password hash is never resolvable.
#[derive(Clone)]
pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn first_name(&self) -> Option<&str> {
        self.0.first_name.as_deref()
    }

    async fn last_name(&self) -> Option<&str> {
        self.0.last_name.as_deref()
    }

    async fn email_address(&self) -> Option<&str> {
        self.0.email_address.as_deref()
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// Users this user follows.
    async fn following(&self, ctx: &Context<'_>) -> Result<Vec<UserObject>> {
        load_users(ctx, &self.0.following).await
    }

    /// Users following this user.
    async fn followers(&self, ctx: &Context<'_>) -> Result<Vec<UserObject>> {
        load_users(ctx, &self.0.followers).await
    }
}

#[derive(Clone)]
pub struct FlightObject(pub Flight);

#[Object(name = "Flight")]
impl FlightObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn flight_time_date(&self) -> DateTime<Utc> {
        self.0.flight_time_date
    }

    /// Duration in hours.
    async fn total_flight_time(&self) -> f64 {
        self.0.total_flight_time
    }

    /// The user who logged the flight, if the account still exists.
    async fn created_by(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
        Ok(loader
            .load_one(self.0.created_by.clone())
            .await?
            .map(UserObject))
    }
}

/// A `{type, message}` entry of a response's `errors` list.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "FieldError")]
pub struct ErrorEntry {
    #[graphql(name = "type")]
    pub kind: String,
    pub message: String,
}

impl From<ResponseError> for ErrorEntry {
    fn from(err: ResponseError) -> Self {
        Self {
            kind: err.kind.as_str().to_string(),
            message: err.message,
        }
    }
}

#[derive(InputObject)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    /// Account to update; must be the caller's own.
    pub username: String,
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUserInput {
    pub fn into_parts(self) -> (String, ProfileUpdate) {
        (
            self.username,
            ProfileUpdate {
                email_address: self.email_address,
                first_name: self.first_name,
                last_name: self.last_name,
            },
        )
    }
}

#[derive(InputObject)]
#[graphql(name = "FlightInfoInput")]
pub struct FlightInput {
    pub flight_time_date: DateTime<Utc>,
    /// Duration in hours.
    pub total_flight_time: f64,
}

/// Result of a user or social operation.
#[derive(SimpleObject, Default)]
pub struct UserResponse {
    errors: Option<Vec<ErrorEntry>>,
    user: Option<UserObject>,
    users: Option<Vec<UserObject>>,
    token: Option<String>,
}

impl UserResponse {
    fn failed(err: ResponseError) -> Self {
        Self {
            errors: Some(vec![err.into()]),
            ..Default::default()
        }
    }
}

impl From<Outcome<User>> for UserResponse {
    fn from(outcome: Outcome<User>) -> Self {
        match outcome {
            Ok(user) => Self {
                user: Some(UserObject(user)),
                ..Default::default()
            },
            Err(err) => Self::failed(err),
        }
    }
}

impl From<Outcome<Vec<User>>> for UserResponse {
    fn from(outcome: Outcome<Vec<User>>) -> Self {
        match outcome {
            Ok(users) => Self {
                users: Some(users.into_iter().map(UserObject).collect()),
                ..Default::default()
            },
            Err(err) => Self::failed(err),
        }
    }
}

impl From<Outcome<String>> for UserResponse {
    fn from(outcome: Outcome<String>) -> Self {
        match outcome {
            Ok(token) => Self {
                token: Some(token),
                ..Default::default()
            },
            Err(err) => Self::failed(err),
        }
    }
}

impl From<Outcome<Session>> for UserResponse {
    fn from(outcome: Outcome<Session>) -> Self {
        match outcome {
            Ok(Session { user, token }) => Self {
                user: Some(UserObject(user)),
                token: Some(token),
                ..Default::default()
            },
            Err(err) => Self::failed(err),
        }
    }
}

/// Result of a flight operation.
#[derive(SimpleObject, Default)]
pub struct FlightResponse {
    errors: Option<Vec<ErrorEntry>>,
    flight: Option<FlightObject>,
    flights: Option<Vec<FlightObject>>,
}

impl From<Outcome<Flight>> for FlightResponse {
    fn from(outcome: Outcome<Flight>) -> Self {
        match outcome {
            Ok(flight) => Self {
                flight: Some(FlightObject(flight)),
                ..Default::default()
            },
            Err(err) => Self {
                errors: Some(vec![err.into()]),
                ..Default::default()
            },
        }
    }
}

impl From<Outcome<Vec<Flight>>> for FlightResponse {
    fn from(outcome: Outcome<Vec<Flight>>) -> Self {
        match outcome {
            Ok(flights) => Self {
                flights: Some(flights.into_iter().map(FlightObject).collect()),
                ..Default::default()
            },
            Err(err) => Self {
                errors: Some(vec![err.into()]),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_has_no_payload() {
        let response = UserResponse::from(Err::<User, _>(ResponseError::user_exists()));

        assert!(response.user.is_none());
        assert!(response.token.is_none());
        assert_eq!(
            response.errors,
            Some(vec![ErrorEntry {
                kind: "user error".to_string(),
                message: "That username already exists.".to_string(),
            }])
        );
    }

    #[test]
    fn test_session_response_carries_user_and_token() {
        let session = Session {
            user: User::new("alice", "h"),
            token: "jwt".to_string(),
        };
        let response = UserResponse::from(Ok(session));

        assert!(response.errors.is_none());
        assert_eq!(response.token.as_deref(), Some("jwt"));
        assert_eq!(response.user.map(|u| u.0.username), Some("alice".to_string()));
    }

    #[test]
    fn test_flight_list_response() {
        let flights = vec![Flight::new(Utc::now(), 1.0, "u1")];
        let response = FlightResponse::from(Ok(flights));

        assert!(response.errors.is_none());
        assert_eq!(response.flights.map(|f| f.len()), Some(1));
    }
}
