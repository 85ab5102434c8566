//! Remote command execution for mgr-testsuite
//!
//! A [`node::Node`] is a named machine in the test topology (server, proxy,
//! clients, build hosts) reachable for shell command execution and file
//! transfer. The [`registry::NodeRegistry`] resolves enumerated target kinds
//! to nodes and is validated at suite start, so an unmapped target fails with
//! a typed error instead of a mid-scenario surprise.

pub mod node;
pub mod os;
pub mod registry;

pub use node::{CommandOutput, Node, RunOpts, Transport};
pub use os::OsFamily;
pub use registry::{NodeRegistry, TargetKind};
