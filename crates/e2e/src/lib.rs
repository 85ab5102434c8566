//! mgr-testsuite scenario runner
//!
//! Scenarios drive the product end to end: shell commands on the test
//! topology's nodes, calls against the HTTP API, and page probes against the
//! web UI, with every asynchronous wait bounded by the shared poll
//! coordinator.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ SuiteRunner                                                │
//! │   ├── ScenarioContext (per scenario, created and dropped)  │
//! │   │     ├── NodeRegistry  -> mgrts-remote                  │
//! │   │     ├── ApiClient     -> mgrts-api                     │
//! │   │     └── Page          -> mgrts-ui                      │
//! │   ├── ScenarioResult / SuiteResult                         │
//! │   └── duration telemetry  -> pushgateway                   │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod runner;
pub mod scenarios;

pub use context::ScenarioContext;
pub use runner::{Scenario, ScenarioResult, SuiteResult, SuiteRunner};
