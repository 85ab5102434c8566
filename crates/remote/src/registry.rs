//! Typed target registry
//!
//! Scenarios address machines by role, not by hostname. [`TargetKind`]
//! enumerates the roles the topology can contain; [`NodeRegistry`] maps them
//! to concrete nodes, is populated once at suite start, and turns any
//! unmapped lookup into a typed [`Error::UnknownTarget`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use mgrts_common::config::SuiteConfig;
use mgrts_common::error::{Error, Result};

use crate::node::{Node, Transport};
use crate::os::OsFamily;

/// Role of a machine in the test topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Server,
    Proxy,
    SleMinion,
    SshMinion,
    RhlikeMinion,
    DeblikeMinion,
    BuildHost,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Server => "server",
            TargetKind::Proxy => "proxy",
            TargetKind::SleMinion => "sle_minion",
            TargetKind::SshMinion => "ssh_minion",
            TargetKind::RhlikeMinion => "rhlike_minion",
            TargetKind::DeblikeMinion => "deblike_minion",
            TargetKind::BuildHost => "build_host",
        }
    }

    pub fn all() -> &'static [TargetKind] {
        &[
            TargetKind::Server,
            TargetKind::Proxy,
            TargetKind::SleMinion,
            TargetKind::SshMinion,
            TargetKind::RhlikeMinion,
            TargetKind::DeblikeMinion,
            TargetKind::BuildHost,
        ]
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownTarget(s.to_string()))
    }
}

/// Node lookup table, populated at suite start and read-only afterwards.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<TargetKind, Node>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the minimal topology from the suite configuration: the server is
    /// mandatory, the proxy optional. Client nodes are registered by the
    /// runner as the environment provides them.
    pub fn from_config(config: &SuiteConfig) -> Self {
        let mut registry = Self::new();
        registry.register(
            TargetKind::Server,
            Node::new(
                TargetKind::Server.as_str(),
                config.server_host.clone(),
                OsFamily::Suse,
                Transport::Ssh {
                    user: "root".to_string(),
                    port: 22,
                },
            ),
        );
        if let Some(proxy) = &config.proxy_host {
            registry.register(
                TargetKind::Proxy,
                Node::new(
                    TargetKind::Proxy.as_str(),
                    proxy.clone(),
                    OsFamily::Suse,
                    Transport::Ssh {
                        user: "root".to_string(),
                        port: 22,
                    },
                ),
            );
        }
        registry
    }

    pub fn register(&mut self, kind: TargetKind, node: Node) {
        self.nodes.insert(kind, node);
    }

    /// Resolve a role to its node; absent roles are [`Error::UnknownTarget`].
    pub fn get(&self, kind: TargetKind) -> Result<&Node> {
        self.nodes
            .get(&kind)
            .ok_or_else(|| Error::UnknownTarget(kind.to_string()))
    }

    /// String-keyed resolution for callers holding a role name.
    pub fn get_by_name(&self, name: &str) -> Result<&Node> {
        self.get(name.parse()?)
    }

    pub fn contains(&self, kind: TargetKind) -> bool {
        self.nodes.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TargetKind, &Node)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_role_names() {
        assert_eq!("server".parse::<TargetKind>().unwrap(), TargetKind::Server);
        assert_eq!(
            "ssh_minion".parse::<TargetKind>().unwrap(),
            TargetKind::SshMinion
        );
    }

    #[test]
    fn unknown_role_name_is_typed_error() {
        let err = "mainframe".parse::<TargetKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownTarget(name) if name == "mainframe"));
    }

    #[test]
    fn lookup_of_unregistered_role_fails() {
        let registry = NodeRegistry::new();
        assert!(matches!(
            registry.get(TargetKind::BuildHost),
            Err(Error::UnknownTarget(_))
        ));
    }

    #[test]
    fn from_config_registers_server_and_optional_proxy() {
        let mut config = SuiteConfig::default();
        let registry = NodeRegistry::from_config(&config);
        assert!(registry.contains(TargetKind::Server));
        assert!(!registry.contains(TargetKind::Proxy));

        config.proxy_host = Some("proxy.mgr.lab".to_string());
        let registry = NodeRegistry::from_config(&config);
        assert_eq!(
            registry.get(TargetKind::Proxy).unwrap().hostname,
            "proxy.mgr.lab"
        );
    }

    #[test]
    fn get_by_name_resolves_through_typed_parse() {
        let config = SuiteConfig::default();
        let registry = NodeRegistry::from_config(&config);
        assert_eq!(
            registry.get_by_name("server").unwrap().hostname,
            config.server_host
        );
        assert!(registry.get_by_name("nonsense").is_err());
    }
}
