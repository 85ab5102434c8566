//! Per-scenario state
//!
//! All state a step can touch lives in an explicit [`ScenarioContext`]
//! created at scenario start and dropped at scenario end: the node registry,
//! the API session, the browser page and a free-form key-value bag scenarios
//! use to pass values between their own steps. Nothing is shared across
//! scenarios.

use std::collections::HashMap;

use mgrts_api::ApiClient;
use mgrts_common::config::SuiteConfig;
use mgrts_common::error::Result;
use mgrts_remote::{Node, NodeRegistry, TargetKind};
use mgrts_ui::page::Page;

pub struct ScenarioContext {
    pub config: SuiteConfig,
    pub nodes: NodeRegistry,
    pub api: ApiClient,
    /// Browser page, present only when the scenario requested one.
    pub page: Option<Box<dyn Page>>,
    values: HashMap<String, String>,
}

impl ScenarioContext {
    pub fn new(config: SuiteConfig) -> Result<Self> {
        let nodes = NodeRegistry::from_config(&config);
        let api = ApiClient::new(config.api_url())?;
        Ok(Self {
            config,
            nodes,
            api,
            page: None,
            values: HashMap::new(),
        })
    }

    pub fn with_page(mut self, page: Box<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }

    /// The management server node; always present in the registry.
    pub fn server(&self) -> Result<&Node> {
        self.nodes.get(TargetKind::Server)
    }

    /// Log in to the API with the configured credentials.
    pub async fn login(&mut self) -> Result<()> {
        let user = self.config.api_user.clone();
        let password = self.config.api_password.clone();
        self.api.login(&user, &password).await
    }

    /// Stash a value for a later step of the same scenario.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn recall(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_bag_round_trips_within_a_scenario() {
        let mut ctx = ScenarioContext::new(SuiteConfig::default()).unwrap();
        assert!(ctx.recall("activation_key").is_none());
        ctx.remember("activation_key", "1-mgrts-key");
        assert_eq!(ctx.recall("activation_key"), Some("1-mgrts-key"));
    }

    #[test]
    fn context_registers_server_from_config() {
        let ctx = ScenarioContext::new(SuiteConfig::default()).unwrap();
        assert_eq!(ctx.server().unwrap().hostname, ctx.config.server_host);
    }
}
