// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running with
//! FIRESTORE_EMULATOR_HOST set. Usernames are randomised so runs against a
//! long-lived emulator do not collide.

use skylog::db::{EdgeChange, FlightStore, StoreError, UserStore};
use skylog::models::user::User;
use skylog::models::{Flight, ProfileUpdate, UserPatch};

mod common;
use common::test_db;

fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_insert_and_find_user() {
    require_emulator!();

    let db = test_db().await;
    let user = User::new(unique_name("alice"), "hash");

    assert!(db.find_user_by_username(&user.username).await.unwrap().is_none());
    db.insert_user(&user).await.unwrap();

    let by_id = db.find_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, user.username);

    let by_name = db.find_user_by_username(&user.username).await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
}

#[tokio::test]
async fn test_username_reservation_conflict() {
    require_emulator!();

    let db = test_db().await;
    let name = unique_name("taken");
    db.insert_user(&User::new(name.clone(), "h1")).await.unwrap();

    let err = db.insert_user(&User::new(name, "h2")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_rename_releases_previous_username() {
    require_emulator!();

    let db = test_db().await;
    let mut user = User::new(unique_name("before"), "hash");
    db.insert_user(&user).await.unwrap();

    let previous = std::mem::replace(&mut user.username, unique_name("after"));
    db.rename_user(&user, &previous).await.unwrap();

    assert!(db.find_user_by_username(&previous).await.unwrap().is_none());
    assert_eq!(
        db.find_user_by_username(&user.username).await.unwrap().unwrap().id,
        user.id
    );

    // The old name can be claimed again
    db.insert_user(&User::new(previous, "hash")).await.unwrap();
}

#[tokio::test]
async fn test_follow_edge_transforms() {
    require_emulator!();

    let db = test_db().await;
    let a = User::new(unique_name("a"), "h");
    let b = User::new(unique_name("b"), "h");
    db.insert_user(&a).await.unwrap();
    db.insert_user(&b).await.unwrap();

    db.set_follow_edge(&a.id, &b.id, EdgeChange::Link).await.unwrap();
    db.set_follow_edge(&a.id, &b.id, EdgeChange::Link).await.unwrap();

    let stored_a = db.find_user_by_id(&a.id).await.unwrap().unwrap();
    let stored_b = db.find_user_by_id(&b.id).await.unwrap().unwrap();
    assert_eq!(stored_a.following, vec![b.id.clone()]);
    assert_eq!(stored_b.followers, vec![a.id.clone()]);

    db.set_follow_edge(&a.id, &b.id, EdgeChange::Unlink).await.unwrap();
    let stored_b = db.find_user_by_id(&b.id).await.unwrap().unwrap();
    assert!(stored_b.followers.is_empty());
}

#[tokio::test]
async fn test_concurrent_follow_edges_all_land() {
    require_emulator!();

    let db = std::sync::Arc::new(test_db().await);
    let target = User::new(unique_name("target"), "h");
    db.insert_user(&target).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..5 {
        let fan = User::new(unique_name(&format!("fan{}", i)), "h");
        db.insert_user(&fan).await.unwrap();
        let db = db.clone();
        let target_id = target.id.clone();
        handles.push(tokio::spawn(async move {
            db.set_follow_edge(&fan.id, &target_id, EdgeChange::Link)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = db.find_user_by_id(&target.id).await.unwrap().unwrap();
    assert_eq!(stored.followers.len(), 5);
}

#[tokio::test]
async fn test_patch_keeps_follow_lists() {
    require_emulator!();

    let db = test_db().await;
    let a = User::new(unique_name("a"), "h");
    let b = User::new(unique_name("b"), "h");
    db.insert_user(&a).await.unwrap();
    db.insert_user(&b).await.unwrap();
    db.set_follow_edge(&a.id, &b.id, EdgeChange::Link).await.unwrap();

    let patch = UserPatch::Profile(ProfileUpdate {
        first_name: Some("Bee".to_string()),
        ..Default::default()
    });
    let stored = db.patch_user(&b.id, &patch).await.unwrap();
    assert_eq!(stored.first_name.as_deref(), Some("Bee"));
    assert_eq!(stored.followers, vec![a.id.clone()]);
}

#[tokio::test]
async fn test_find_many_skips_deleted() {
    require_emulator!();

    let db = test_db().await;
    let a = User::new(unique_name("a"), "h");
    let b = User::new(unique_name("b"), "h");
    db.insert_user(&a).await.unwrap();
    db.insert_user(&b).await.unwrap();
    db.delete_user(&a).await.unwrap();

    let found = db
        .find_users_by_ids(&[a.id.clone(), b.id.clone()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, b.id);
    assert!(db.find_user_by_username(&a.username).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// FLIGHT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_insert_and_find_flight() {
    require_emulator!();

    let db = test_db().await;
    let flight = Flight::new(chrono::Utc::now(), 1.25, "someone");
    db.insert_flight(&flight).await.unwrap();

    let stored = db.find_flight(&flight.id).await.unwrap().unwrap();
    assert_eq!(stored.title, flight.title);
    assert_eq!(stored.total_flight_time, 1.25);

    let all = db.list_flights().await.unwrap();
    assert!(all.iter().any(|f| f.id == flight.id));
}
