//! Shared primitives for the mgr-testsuite E2E framework
//!
//! This crate holds the pieces every other crate in the workspace leans on:
//! - the error types surfaced to scenarios ([`error`])
//! - the bounded-retry poll coordinator ([`retry`])
//! - log-based duration extraction for telemetry ([`duration`])
//! - the Prometheus pushgateway client ([`metrics`])
//! - environment-driven suite configuration ([`config`])

pub mod config;
pub mod duration;
pub mod error;
pub mod metrics;
pub mod retry;

pub use config::SuiteConfig;
pub use error::{Error, Result};
pub use retry::{repeat_until_timeout, Poll, RetryOpts};
