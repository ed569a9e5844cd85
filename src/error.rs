// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Startup errors returned from `main`.
//!
//! Request failures never reach this type; they travel inside GraphQL
//! responses as `errors` entries.

use crate::config::ConfigError;
use crate::db::StoreError;

/// Failure while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}
