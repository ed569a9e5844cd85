// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts and their follow lists)
//! - Usernames (create-only reservations that keep usernames unique)
//! - Flights (flight log entries)

use crate::db::{collections, EdgeChange, FlightStore, StoreError, UserStore};
use crate::models::{Flight, User, UserPatch};
use async_trait::async_trait;
use firestore::document_transform_builder::FirestoreTransformFieldExpr;
use firestore::errors::FirestoreError;
use firestore::{FirestoreFieldTransform, FirestoreWritePrecondition};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Document in the `usernames` collection that reserves a username.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UsernameReservation {
    user_id: String,
}

/// Document ID for a username reservation.
///
/// Usernames may contain `/` or be `.`, neither of which is a legal document
/// ID, so they are url-encoded behind a fixed prefix.
fn reservation_id(username: &str) -> String {
    format!("name_{}", urlencoding::encode(username))
}

fn db_err(e: FirestoreError) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Server-side array operation for one side of a follow edge.
fn edge_transform(
    field: FirestoreTransformFieldExpr,
    id: &str,
    change: EdgeChange,
) -> Option<FirestoreFieldTransform> {
    match change {
        EdgeChange::Link => field.append_missing_elements([id]),
        EdgeChange::Unlink => field.remove_all_from_array([id]),
    }
}

fn reservation_err(e: FirestoreError, username: &str) -> StoreError {
    match e {
        FirestoreError::DataConflictError(_) => {
            StoreError::Conflict(format!("username '{}' is already taken", username))
        }
        other => db_err(other),
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Backend("Database not connected (offline mode)".to_string()))
    }

    // ─── Username Reservations ───────────────────────────────────

    /// Claim `username` for `user_id`. Create-only, so a concurrent claim of
    /// the same name fails with a conflict.
    async fn reserve_username(&self, username: &str, user_id: &str) -> Result<(), StoreError> {
        let reservation = UsernameReservation {
            user_id: user_id.to_string(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERNAMES)
            .document_id(reservation_id(username))
            .object(&reservation)
            .execute()
            .await
            .map_err(|e| reservation_err(e, username))?;
        Ok(())
    }

    /// Drop a reservation after a failed write. Failures are only logged;
    /// the caller is already reporting the original error.
    async fn release_username(&self, username: &str) {
        let result = match self.get_client() {
            Ok(client) => client
                .fluent()
                .delete()
                .from(collections::USERNAMES)
                .document_id(reservation_id(username))
                .execute()
                .await
                .map_err(db_err),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::error!(username, error = %e, "Failed to release username reservation");
        }
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(db_err)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("username").eq(username)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;

        Ok(users.into_iter().next())
    }

    /// Fetches each document concurrently, bounded by `MAX_CONCURRENT_DB_OPS`.
    async fn find_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, StoreError> {
        let client = self.get_client()?;

        let found = stream::iter(ids.iter().cloned())
            .map(|id: String| async move {
                client
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .obj::<User>()
                    .one(&id)
                    .await
                    .map_err(db_err)
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<User>, StoreError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<User>>, StoreError>>()?;

        let missing = found.iter().filter(|user| user.is_none()).count();
        if missing > 0 {
            tracing::debug!(missing, "Skipping dangling user references");
        }

        Ok(found.into_iter().flatten().collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.reserve_username(&user.username, &user.id).await?;

        let inserted: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await;

        if let Err(e) = inserted {
            self.release_username(&user.username).await;
            return Err(db_err(e));
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(())
    }

    /// Writes the patched fields under a field mask, so list fields changed
    /// concurrently by follow edges are never overwritten.
    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, StoreError> {
        let mut user = self
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        let fields = patch.fields();
        if fields.is_empty() {
            return Ok(user);
        }
        patch.apply(&mut user);

        let updated: User = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(&user)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(updated)
    }

    /// Reserves the new name first, then writes the username field and drops
    /// the old reservation in one transaction.
    async fn rename_user(&self, user: &User, previous_username: &str) -> Result<(), StoreError> {
        self.reserve_username(&user.username, &user.id).await?;

        let client = self.get_client()?;
        let committed: Result<(), StoreError> = async {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

            client
                .fluent()
                .update()
                .fields(firestore::paths!(User::{username}))
                .in_col(collections::USERS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(&user.id)
                .object(user)
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;

            client
                .fluent()
                .delete()
                .from(collections::USERNAMES)
                .document_id(reservation_id(previous_username))
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;

            transaction
                .commit()
                .await
                .map_err(|e| StoreError::Backend(format!("Transaction commit failed: {}", e)))?;
            Ok(())
        }
        .await;

        if committed.is_err() {
            self.release_username(&user.username).await;
        }
        committed
    }

    /// Both sides are array transforms applied by the server in one commit,
    /// so edges written concurrently to the same user all survive.
    async fn set_follow_edge(
        &self,
        follower_id: &str,
        followee_id: &str,
        change: EdgeChange,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        if follower_id == followee_id {
            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(follower_id)
                .transforms(|t| {
                    t.fields([
                        edge_transform(t.field("following"), followee_id, change),
                        edge_transform(t.field("followers"), follower_id, change),
                    ])
                })
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;
        } else {
            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(follower_id)
                .transforms(|t| t.fields([edge_transform(t.field("following"), followee_id, change)]))
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;

            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(followee_id)
                .transforms(|t| t.fields([edge_transform(t.field("followers"), follower_id, change)]))
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(follower_id, followee_id, ?change, "Follow edge written");
        Ok(())
    }

    async fn delete_user(&self, user: &User) -> Result<(), StoreError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(&user.id)
            .add_to_transaction(&mut transaction)
            .map_err(db_err)?;

        client
            .fluent()
            .delete()
            .from(collections::USERNAMES)
            .document_id(reservation_id(&user.username))
            .add_to_transaction(&mut transaction)
            .map_err(db_err)?;

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to commit user deletion: {}", e)))?;

        tracing::info!(user_id = %user.id, "User deleted");
        Ok(())
    }
}

#[async_trait]
impl FlightStore for FirestoreDb {
    async fn list_flights(&self) -> Result<Vec<Flight>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FLIGHTS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FLIGHTS)
            .obj()
            .one(id)
            .await
            .map_err(db_err)
    }

    async fn insert_flight(&self, flight: &Flight) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::FLIGHTS)
            .document_id(&flight.id)
            .object(flight)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_id_is_a_legal_document_id() {
        assert_eq!(reservation_id("alice"), "name_alice");
        assert_eq!(reservation_id("a/b"), "name_a%2Fb");
        assert_eq!(reservation_id("."), "name_.");
    }

    #[tokio::test]
    async fn test_offline_client_reports_backend_error() {
        let db = FirestoreDb::new_mock();
        let err = db.find_user_by_username("alice").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
