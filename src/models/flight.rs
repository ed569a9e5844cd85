// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flight log entries.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A logged flight, stored in the `flights` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Document ID
    pub id: String,
    /// Display label derived from the hour of departure
    pub title: String,
    pub flight_time_date: DateTime<Utc>,
    /// Duration in hours
    pub total_flight_time: f64,
    /// ID of the user who logged the flight
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Flight {
    pub fn new(flight_time_date: DateTime<Utc>, total_flight_time: f64, created_by: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: flight_title(flight_time_date.hour()).to_string(),
            flight_time_date,
            total_flight_time,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Title bucket for a flight departing at `hour` (0-23, UTC).
pub fn flight_title(hour: u32) -> &'static str {
    match hour {
        6..=11 => "Morning flight",
        12..=17 => "Afternoon flight",
        18..=21 => "Evening flight",
        _ => "Night flight",
    }
}
