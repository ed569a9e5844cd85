// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and bearer-token signing.
//!
//! Passwords are stored as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with
//! unpadded base64 for the binary parts. The iteration count travels with
//! the hash, so raising it only affects newly hashed passwords.

use crate::config::Config;
use crate::models::User;
use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

const HASH_SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = ring::digest::SHA256_OUTPUT_LEN;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username at the time the token was issued
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Credential errors
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Failed to generate salt")]
    Salt,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hashes passwords and issues/verifies bearer tokens.
#[derive(Clone)]
pub struct Credentials {
    signing_key: Vec<u8>,
    token_ttl: chrono::Duration,
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl Credentials {
    pub fn new(config: &Config) -> Self {
        Self {
            signing_key: config.jwt_signing_key.clone(),
            token_ttl: chrono::Duration::days(config.token_ttl_days),
            iterations: NonZeroU32::new(config.password_hash_iterations)
                .unwrap_or(NonZeroU32::MIN),
            rng: SystemRandom::new(),
        }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng.fill(&mut salt).map_err(|_| CredentialError::Salt)?;

        let mut hash = [0u8; HASH_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(format!(
            "{}${}${}${}",
            HASH_SCHEME,
            self.iterations,
            BASE64.encode(salt),
            BASE64.encode(hash)
        ))
    }

    /// Check `password` against a stored hash. Malformed hashes never verify.
    pub fn verify_password(&self, stored_hash: &str, password: &str) -> bool {
        let parts: Vec<&str> = stored_hash.split('$').collect();
        if parts.len() != 4 || parts[0] != HASH_SCHEME {
            tracing::warn!("Stored password hash has an unknown format");
            return false;
        }

        let (Ok(iterations), Ok(salt), Ok(hash)) = (
            parts[1].parse::<NonZeroU32>(),
            BASE64.decode(parts[2]),
            BASE64.decode(parts[3]),
        ) else {
            tracing::warn!("Stored password hash is malformed");
            return false;
        };

        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            &salt,
            password.as_bytes(),
            &hash,
        )
        .is_ok()
    }

    /// [`Self::hash_password`] on the blocking pool, keeping PBKDF2 off the
    /// async workers.
    pub async fn hash_password_blocking(&self, password: &str) -> Result<String, CredentialError> {
        let credentials = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.hash_password(&password)).await?
    }

    /// [`Self::verify_password`] on the blocking pool.
    pub async fn verify_password_blocking(
        &self,
        stored_hash: &str,
        password: &str,
    ) -> Result<bool, CredentialError> {
        let credentials = self.clone();
        let stored_hash = stored_hash.to_string();
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || {
            credentials.verify_password(&stored_hash, &password)
        })
        .await?)
    }

    /// Create a JWT bound to the user's ID and current username.
    pub fn issue_token(&self, user: &User) -> Result<String, CredentialError> {
        let now = chrono::Utc::now();

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp() as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )?)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, CredentialError> {
        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);

        Ok(decode::<Claims>(token, &key, &validation)?.claims)
    }
}
