// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flight log queries and mutations.

use crate::graphql::types::{FlightInput, FlightResponse};
use crate::graphql::{app, caller};
use async_graphql::{Context, Object, ID};

#[derive(Default)]
pub struct FlightQuery;

#[Object]
impl FlightQuery {
    async fn get_all_flights(&self, ctx: &Context<'_>) -> FlightResponse {
        app(ctx).flights.get_all_flights().await.into()
    }

    async fn get_flight(&self, ctx: &Context<'_>, id: ID) -> FlightResponse {
        app(ctx).flights.get_flight(&id).await.into()
    }
}

#[derive(Default)]
pub struct FlightMutation;

#[Object]
impl FlightMutation {
    async fn create_flight(&self, ctx: &Context<'_>, options: FlightInput) -> FlightResponse {
        app(ctx)
            .flights
            .create_flight(options.flight_time_date, options.total_flight_time, caller(ctx))
            .await
            .into()
    }
}
