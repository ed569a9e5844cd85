// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flight log operations.

use crate::config::Environment;
use crate::db::Store;
use crate::models::{Flight, User};
use crate::response::{Outcome, ResponseError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const FLIGHT_FAILURE: &str = "Could not mutate flight.";

#[derive(Clone)]
pub struct FlightService {
    store: Arc<dyn Store>,
    environment: Environment,
}

impl FlightService {
    pub fn new(store: Arc<dyn Store>, environment: Environment) -> Self {
        Self { store, environment }
    }

    pub async fn get_all_flights(&self) -> Outcome<Vec<Flight>> {
        self.store
            .list_flights()
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch flights."))
    }

    pub async fn get_flight(&self, id: &str) -> Outcome<Flight> {
        self.store
            .find_flight(id)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, "Could not fetch flight."))?
            .ok_or_else(ResponseError::missing_flight)
    }

    /// Log a flight for the caller. The title is derived from the departure hour.
    pub async fn create_flight(
        &self,
        flight_time_date: DateTime<Utc>,
        total_flight_time: f64,
        caller: Option<&User>,
    ) -> Outcome<Flight> {
        let caller = caller.ok_or_else(ResponseError::not_authorised)?;
        let flight = Flight::new(flight_time_date, total_flight_time, &caller.id);

        self.store
            .insert_flight(&flight)
            .await
            .map_err(|e| ResponseError::persistence(&e, self.environment, FLIGHT_FAILURE))?;

        tracing::info!(
            flight_id = %flight.id,
            user_id = %caller.id,
            title = %flight.title,
            "Flight logged"
        );
        Ok(flight)
    }
}
