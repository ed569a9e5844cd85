// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Everything except the
//! JWT signing key has a default.

use std::env;

/// Default minimum password length, in characters.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Deployment environment.
///
/// Outside production, raw persistence error messages are returned to
/// clients to ease debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    /// Parse an `APP_ENV` value. Unknown values fall back to development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub environment: Environment,
    pub store_backend: StoreBackend,
    /// Minimum accepted password length, in characters
    pub min_password_length: usize,
    /// Lifetime of issued bearer tokens
    pub token_ttl_days: i64,
    /// PBKDF2 iteration count for new password hashes
    pub password_hash_iterations: u32,
    /// JWT signing key for bearer tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            environment: Environment::Test,
            store_backend: StoreBackend::Memory,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            token_ttl_days: 30,
            // Cheap hashing keeps the test suite fast.
            password_hash_iterations: 1_000,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StoreBackend::Firestore,
            "memory" => StoreBackend::Memory,
            other => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or_default(),
            store_backend,
            min_password_length: parse_or("MIN_PASSWORD_LENGTH", DEFAULT_MIN_PASSWORD_LENGTH)?,
            token_ttl_days: parse_or("TOKEN_TTL_DAYS", 30)?,
            password_hash_iterations: nonzero(
                "PASSWORD_HASH_ITERATIONS",
                parse_or("PASSWORD_HASH_ITERATIONS", 100_000)?,
            )?,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse an optional numeric variable, rejecting malformed values instead of
/// silently using the default.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// PBKDF2 needs at least one iteration.
fn nonzero(name: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(name, value.to_string()));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
