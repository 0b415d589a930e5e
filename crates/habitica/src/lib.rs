//! Habitica v3 API client with quota-aware request gating.
//!
//! This crate provides:
//! - Wire types for Habitica tasks and the `{ success, data }` envelope
//! - A REST client authenticating via the three fixed Habitica headers
//! - A rate-limit gate that defers requests past the quota window instead of
//!   burning through it
//!
//! The remote quota is communicated through `x-ratelimit-remaining` and
//! `x-ratelimit-reset` response headers; the gate interprets them with
//! last-response-wins semantics and never retries a failed call.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Async API methods can fail for the usual transport reasons

pub mod client;
pub mod errors;
pub mod models;
pub mod rate_limit;

pub use client::{ClientConfig, HabiticaClient, DEFAULT_BASE_URL};
pub use errors::{HabiticaError, HabiticaResult};
pub use models::{ChecklistItem, Task, TaskCategory, TaskQuery};
pub use rate_limit::{RateLimitState, RateLimitedGate};
