// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod flight;
pub mod user;

pub use flight::{flight_title, Flight};
pub use user::{ProfileUpdate, User, UserPatch};
