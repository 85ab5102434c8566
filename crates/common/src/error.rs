//! Error types for mgr-testsuite

use std::time::Duration;

use thiserror::Error;

/// Result type alias using the suite-wide Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to scenarios
///
/// Every failure a scenario can observe is one of these kinds; helpers never
/// swallow errors. The only "retry" signal in the suite is the poll
/// coordinator's explicit `Poll::Pending`, which is not an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("timed out after {elapsed:.1?} (limit {timeout:.1?}): {message}")]
    TimeoutExceeded {
        message: String,
        timeout: Duration,
        elapsed: Duration,
    },

    #[error("command `{command}` on {host} exited with {exit_code}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        host: String,
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("API call {call} failed: {fault_message} (fault {fault_code})")]
    ApiCallFailed {
        call: String,
        fault_code: i64,
        fault_message: String,
    },

    #[error("scheduled action {id} ({name}) failed on the server")]
    ActionFailed { id: i64, name: String },

    #[error("no sync duration found in log output for {0}")]
    DurationNotFound(String),

    #[error("file injection is not supported on {0}")]
    FileInjectionUnsupported(String),

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the timeout kind, regardless of which wait produced it.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::TimeoutExceeded { .. })
    }
}
