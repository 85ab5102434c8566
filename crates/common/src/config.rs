//! Environment-driven suite configuration
//!
//! The harness inherits everything it needs to know about the test
//! environment from `MGRTS_*` variables, with defaults that match the
//! containerized lab setup.

use std::time::Duration;

/// Configuration shared by a whole suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Hostname of the management server under test.
    pub server_host: String,
    /// Hostname of the proxy, when the topology has one.
    pub proxy_host: Option<String>,
    /// API credentials.
    pub api_user: String,
    pub api_password: String,
    /// Pushgateway base URL for duration telemetry, when enabled.
    pub pushgateway_url: Option<String>,
    /// Default budget for UI and remote-state waits.
    pub default_timeout: Duration,
    /// Log remote commands and their output.
    pub verbose_commands: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            server_host: "server.mgr.lab".to_string(),
            proxy_host: None,
            api_user: "admin".to_string(),
            api_password: "admin".to_string(),
            pushgateway_url: None,
            default_timeout: Duration::from_secs(250),
            verbose_commands: false,
        }
    }
}

impl SuiteConfig {
    /// Build the configuration from `MGRTS_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_host: env_or("MGRTS_SERVER", defaults.server_host),
            proxy_host: std::env::var("MGRTS_PROXY").ok().filter(|v| !v.is_empty()),
            api_user: env_or("MGRTS_API_USER", defaults.api_user),
            api_password: env_or("MGRTS_API_PASSWORD", defaults.api_password),
            pushgateway_url: std::env::var("MGRTS_PUSHGATEWAY_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            default_timeout: std::env::var("MGRTS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_timeout),
            verbose_commands: std::env::var("MGRTS_VERBOSE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Base URL of the product's HTTP API.
    pub fn api_url(&self) -> String {
        format!("https://{}/rhn/manager/api", self.server_host)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}
