// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User identity queries and mutations.

use crate::graphql::types::{UpdateUserInput, UserResponse, UsernamePasswordInput};
use crate::graphql::{app, caller};
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn get_all_users(&self, ctx: &Context<'_>) -> UserResponse {
        app(ctx).users.get_all_users().await.into()
    }

    async fn get_user(&self, ctx: &Context<'_>, username: String) -> UserResponse {
        app(ctx).users.get_user(&username).await.into()
    }

    /// The user identified by the request's token.
    async fn who_am_i(&self, ctx: &Context<'_>) -> UserResponse {
        app(ctx).users.who_am_i(caller(ctx)).await.into()
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(&self, ctx: &Context<'_>, options: UsernamePasswordInput) -> UserResponse {
        app(ctx)
            .users
            .create_user(&options.username, &options.password)
            .await
            .into()
    }

    /// Returns a token only.
    async fn login_user(&self, ctx: &Context<'_>, options: UsernamePasswordInput) -> UserResponse {
        app(ctx)
            .users
            .login_user(&options.username, &options.password)
            .await
            .into()
    }

    async fn update_user(&self, ctx: &Context<'_>, options: UpdateUserInput) -> UserResponse {
        let (username, update) = options.into_parts();
        app(ctx)
            .users
            .update_user(&username, update, caller(ctx))
            .await
            .into()
    }

    /// Returns the renamed user and a token for the new username.
    async fn update_username(
        &self,
        ctx: &Context<'_>,
        username: String,
        new_username: String,
    ) -> UserResponse {
        app(ctx)
            .users
            .update_username(&username, &new_username, caller(ctx))
            .await
            .into()
    }

    async fn update_password(
        &self,
        ctx: &Context<'_>,
        password: String,
        new_password: String,
    ) -> UserResponse {
        app(ctx)
            .users
            .update_password(&password, &new_password, caller(ctx))
            .await
            .into()
    }

    async fn delete_user(&self, ctx: &Context<'_>, username: String) -> UserResponse {
        app(ctx)
            .users
            .delete_user(&username, caller(ctx))
            .await
            .into()
    }
}
