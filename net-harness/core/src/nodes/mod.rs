//! Declarative node configuration consumed by the manifest builder.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Role of one participant in the test network.
///
/// A closed set: command synthesis and label derivation branch on this via
/// exhaustive matches, so adding a role is a compile-time-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    Bootnode,
    FullNode,
    Authority,
    RelayCollator,
    Temp,
}

impl NodeRole {
    /// Label value recorded in the manifest metadata for this role.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bootnode => "bootnode",
            Self::FullNode => "full-node",
            Self::Authority => "authority",
            Self::RelayCollator => "relay-collator",
            Self::Temp => "temp",
        }
    }
}

/// One environment variable passed to a launched node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A file staged into the node's config directory before launch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideFile {
    /// Source path on the harness host.
    pub local_path: String,
    /// Destination name inside the node's cfg directory.
    pub remote_name: String,
}

/// Immutable configuration of one node, unique by `name` within a
/// namespace. Built once by the caller and consumed by the resource
/// definition builder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Explicit role tag; takes precedence over the `validator` flag when
    /// deriving labels and picking a synthesis strategy.
    pub role: Option<NodeRole>,
    /// Container image or binary reference handed to the execution client.
    pub image: String,
    /// Chain identifier passed via the chain selector flag.
    pub chain: String,
    /// Override for the node binary invoked by the synthesized command.
    pub command: Option<String>,
    /// Verbatim launch line; set only on temp utility nodes, bypasses
    /// command synthesis entirely.
    pub full_command: Option<String>,
    pub validator: bool,
    /// Bootnode addresses; may contain `{{net:..}}` placeholders resolved
    /// against the live topology before launch.
    pub bootnodes: Vec<String>,
    pub args: Vec<String>,
    pub env: Vec<EnvVar>,
    pub telemetry_url: Option<String>,
    pub overrides: Vec<OverrideFile>,
    /// Explicit host ports; `None` means allocate randomly. There is no
    /// p2p override field: the p2p host port is always allocated.
    pub rpc_port: Option<u16>,
    pub ws_port: Option<u16>,
    pub prometheus_port: Option<u16>,
}

impl NodeSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            image: image.into(),
            chain: chain.into(),
            command: None,
            full_command: None,
            validator: false,
            bootnodes: Vec::new(),
            args: Vec::new(),
            env: Vec::new(),
            telemetry_url: None,
            overrides: Vec::new(),
            rpc_port: None,
            ws_port: None,
            prometheus_port: None,
        }
    }

    /// Temporary utility node running a one-shot command line. The name is
    /// made unique with a process-wide counter so repeated temp nodes in
    /// one namespace never collide.
    #[must_use]
    pub fn temp(
        image: impl Into<String>,
        chain: impl Into<String>,
        full_command: impl Into<String>,
    ) -> Self {
        let mut spec = Self::new(unique_name("temp"), image, chain);
        spec.role = Some(NodeRole::Temp);
        spec.full_command = Some(full_command.into());
        spec
    }

    #[must_use]
    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub const fn with_validator(mut self, validator: bool) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    #[must_use]
    pub fn with_bootnodes(mut self, bootnodes: Vec<String>) -> Self {
        self.bootnodes = bootnodes;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Label recorded for this node, with the documented precedence:
    /// explicit role tag, then the validator flag, then the full-node
    /// default.
    #[must_use]
    pub fn role_label(&self) -> &'static str {
        match self.role {
            Some(role) => role.label(),
            None if self.validator => NodeRole::Authority.label(),
            None => NodeRole::FullNode.label(),
        }
    }
}

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `prefix-N` with a process-wide monotonic suffix.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let suffix = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_label_precedence() {
        let explicit = NodeSpec::new("a", "img", "dev")
            .with_role(NodeRole::Bootnode)
            .with_validator(true);
        assert_eq!(explicit.role_label(), "bootnode");

        let validator = NodeSpec::new("b", "img", "dev").with_validator(true);
        assert_eq!(validator.role_label(), "authority");

        let plain = NodeSpec::new("c", "img", "dev");
        assert_eq!(plain.role_label(), "full-node");
    }

    #[test]
    fn unique_names_are_distinct() {
        let first = unique_name("temp");
        let second = unique_name("temp");
        assert_ne!(first, second);
    }

    #[test]
    fn temp_node_carries_full_command() {
        let spec = NodeSpec::temp("img", "dev", "echo done");
        assert_eq!(spec.role, Some(NodeRole::Temp));
        assert_eq!(spec.full_command.as_deref(), Some("echo done"));
        assert!(spec.name.starts_with("temp-"));
    }
}
