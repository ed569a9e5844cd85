// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flight log tests.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use skylog::config::{Config, Environment};
use skylog::response::{ErrorKind, ResponseError};

mod common;
use common::{create_test_app, graphql, login, register, test_state, test_state_with};

const CREATE_FLIGHT: &str = "mutation($options: FlightInfoInput!) {
    createFlight(options: $options) {
        errors { type message }
        flight { id title totalFlightTime flightTimeDate createdBy { username } }
    }
}";

#[tokio::test]
async fn test_create_flight_requires_caller() {
    let (state, _) = test_state();

    let err = state
        .flights
        .create_flight(Utc::now(), 1.0, None)
        .await
        .unwrap_err();
    assert_eq!(err, ResponseError::not_authorised());
    assert!(state.flights.get_all_flights().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_and_get_flight() {
    let (state, _) = test_state();
    let alice = state.users.create_user("alice", "password123").await.unwrap();

    let when = Utc.with_ymd_and_hms(2024, 3, 10, 7, 15, 0).unwrap();
    let flight = state
        .flights
        .create_flight(when, 2.5, Some(&alice))
        .await
        .unwrap();

    assert_eq!(flight.title, "Morning flight");
    assert_eq!(flight.created_by, alice.id);

    let fetched = state.flights.get_flight(&flight.id).await.unwrap();
    assert_eq!(fetched, flight);

    assert_eq!(
        state.flights.get_flight("missing").await.unwrap_err(),
        ResponseError::missing_flight()
    );
}

#[tokio::test]
async fn test_flights_listed_oldest_first() {
    let (state, _) = test_state();
    let alice = state.users.create_user("alice", "password123").await.unwrap();

    for hours in [1.0, 2.0, 3.0] {
        state
            .flights
            .create_flight(Utc::now(), hours, Some(&alice))
            .await
            .unwrap();
    }

    let flights = state.flights.get_all_flights().await.unwrap();
    let hours: Vec<f64> = flights.iter().map(|f| f.total_flight_time).collect();
    assert_eq!(hours, vec![1.0, 2.0, 3.0]);
}

#[tokio::test]
async fn test_flight_write_failure_in_production() {
    let (state, db) = test_state_with(Config {
        environment: Environment::Production,
        ..Config::default()
    });
    let alice = state.users.create_user("alice", "password123").await.unwrap();
    db.fail_all_writes();

    let err = state
        .flights
        .create_flight(Utc::now(), 1.0, Some(&alice))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Persistence);
    assert_eq!(err.message, "Could not mutate flight.");
}

#[tokio::test]
async fn test_create_flight_through_api() {
    let (app, _, _) = create_test_app();
    register(&app, "alice", "password123").await;
    let token = login(&app, "alice", "password123").await;

    let options = json!({
        "options": { "flightTimeDate": "2024-06-01T19:30:00Z", "totalFlightTime": 1.5 }
    });

    let body = graphql(&app, CREATE_FLIGHT, options.clone(), None).await;
    assert_eq!(
        body["data"]["createFlight"]["errors"][0]["type"],
        "authorisation error"
    );

    let body = graphql(&app, CREATE_FLIGHT, options, Some(&token)).await;
    let flight = &body["data"]["createFlight"]["flight"];
    assert_eq!(flight["title"], "Evening flight");
    assert_eq!(flight["totalFlightTime"], 1.5);
    assert_eq!(flight["createdBy"], json!({ "username": "alice" }));

    let id = flight["id"].as_str().unwrap();
    let body = graphql(
        &app,
        "query($id: ID!) { getFlight(id: $id) { errors { message } flight { title } } }",
        json!({ "id": id }),
        None,
    )
    .await;
    assert_eq!(body["data"]["getFlight"]["flight"]["title"], "Evening flight");

    let body = graphql(
        &app,
        "{ getFlight(id: \"nope\") { errors { type message } flight { id } } }",
        json!({}),
        None,
    )
    .await;
    assert_eq!(body["data"]["getFlight"]["flight"], Value::Null);
    assert_eq!(
        body["data"]["getFlight"]["errors"],
        json!([{ "type": "user error", "message": "Flight doesn't exist." }])
    );
}

#[tokio::test]
async fn test_flight_of_deleted_user_has_no_creator() {
    let (app, state, _) = create_test_app();
    let alice = state.users.create_user("alice", "password123").await.unwrap();
    state
        .flights
        .create_flight(Utc::now(), 1.0, Some(&alice))
        .await
        .unwrap();
    state.users.delete_user("alice", Some(&alice)).await.unwrap();

    let body = graphql(
        &app,
        "{ getAllFlights { flights { title createdBy { username } } } }",
        json!({}),
        None,
    )
    .await;
    let flights = body["data"]["getAllFlights"]["flights"].as_array().unwrap();
    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0]["createdBy"], Value::Null);
}
