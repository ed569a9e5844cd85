// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Follow graph queries and mutations. All of them act on the caller.

use crate::graphql::types::UserResponse;
use crate::graphql::{app, caller};
use async_graphql::{Context, Object};

#[derive(Default)]
pub struct SocialQuery;

#[Object]
impl SocialQuery {
    async fn get_followers(&self, ctx: &Context<'_>) -> UserResponse {
        app(ctx).social.get_followers(caller(ctx)).await.into()
    }

    async fn get_following(&self, ctx: &Context<'_>) -> UserResponse {
        app(ctx).social.get_following(caller(ctx)).await.into()
    }
}

#[derive(Default)]
pub struct SocialMutation;

#[Object]
impl SocialMutation {
    async fn follow_user(&self, ctx: &Context<'_>, username: String) -> UserResponse {
        app(ctx)
            .social
            .follow_user(&username, caller(ctx))
            .await
            .into()
    }

    async fn unfollow_user(&self, ctx: &Context<'_>, username: String) -> UserResponse {
        app(ctx)
            .social
            .unfollow_user(&username, caller(ctx))
            .await
            .into()
    }

    async fn remove_follower(&self, ctx: &Context<'_>, username: String) -> UserResponse {
        app(ctx)
            .social
            .remove_follower(&username, caller(ctx))
            .await
            .into()
    }
}
