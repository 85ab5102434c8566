//! API client for the management server
//!
//! [`client::ApiClient`] speaks the product's HTTP API: `login` yields an
//! opaque session token attached to every subsequent call, `logout`
//! invalidates it. The [`namespace`] modules are thin façades grouping
//! related calls (users, channels, activation keys, schedules, audit); each
//! method maps onto exactly one remote call plus parameter shaping.

pub mod client;
pub mod namespace;

pub use client::{ApiClient, SessionToken};
