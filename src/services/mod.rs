// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod flights;
pub mod social;
pub mod users;

pub use credentials::{Claims, CredentialError, Credentials};
pub use flights::FlightService;
pub use social::SocialService;
pub use users::{Session, UserService};
