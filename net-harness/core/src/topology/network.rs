//! Registry of launched nodes and placeholder substitution over manifests.
//!
//! Commands reference peers symbolically (`{{net:alice:multiaddr}}`) until
//! the referenced node is running; once registered here, substitution
//! rewrites those references to concrete values. Not a singleton: callers
//! own a `Network` per namespace and share it via `Arc` where needed.

use std::{
    collections::HashMap,
    net::IpAddr,
    sync::{PoisonError, RwLock},
};

use thiserror::Error;
use tracing::debug;

use crate::provision::{NodeCommand, ResourceDefinition};

const PLACEHOLDER_OPEN: &str = "{{net:";
const PLACEHOLDER_CLOSE: &str = "}}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    /// The referenced node is not registered yet: a launch-ordering bug in
    /// the caller, distinct from any provisioning failure.
    #[error("placeholder references unknown node '{name}' (not registered yet?)")]
    UnknownNode { name: String },
    #[error("placeholder references unknown field '{field}' of node '{name}'")]
    UnknownField { name: String, field: String },
    #[error("malformed network placeholder near '{snippet}'")]
    Malformed { snippet: String },
}

/// Runtime identity of a launched node, as reported by the execution
/// client plus the host ports assigned at build time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRuntimeInfo {
    pub ip: IpAddr,
    pub peer_id: String,
    pub rpc_port: u16,
    pub ws_port: u16,
    pub prometheus_port: u16,
    pub p2p_port: u16,
}

impl NodeRuntimeInfo {
    /// WebSocket RPC endpoint of the node.
    #[must_use]
    pub fn ws_endpoint(&self) -> String {
        format!("ws://{}:{}", self.ip, self.ws_port)
    }

    /// HTTP RPC endpoint of the node.
    #[must_use]
    pub fn rpc_endpoint(&self) -> String {
        format!("http://{}:{}", self.ip, self.rpc_port)
    }

    /// p2p multiaddr of the node, usable as a bootnode address.
    #[must_use]
    pub fn multiaddr(&self) -> String {
        format!("/ip4/{}/tcp/{}/p2p/{}", self.ip, self.p2p_port, self.peer_id)
    }
}

/// Mutable, namespace-scoped registry of launched nodes. Grows as nodes
/// come up and never shrinks during the network's lifetime; dropped
/// wholesale at teardown.
#[derive(Debug)]
pub struct Network {
    namespace: String,
    nodes: RwLock<HashMap<String, NodeRuntimeInfo>>,
}

impl Network {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            nodes: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Record a launched node. Names are a caller-enforced invariant;
    /// registering a duplicate name is last-writer-wins.
    pub fn register(&self, name: impl Into<String>, info: NodeRuntimeInfo) {
        let name = name.into();
        debug!(namespace = %self.namespace, node = %name, peer_id = %info.peer_id, "registering node");
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, info);
    }

    #[must_use]
    pub fn runtime_info(&self, name: &str) -> Option<NodeRuntimeInfo> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Rewrite every `{{net:<node>:<field>}}` occurrence in `input` using
    /// the registry. Fields: `address`, `multiaddr`, `peer-id`. Resolved
    /// output contains no placeholder syntax, so the operation is
    /// idempotent.
    pub fn resolve_str(&self, input: &str) -> Result<String, SubstitutionError> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
            out.push_str(&rest[..start]);
            let body_and_tail = &rest[start + PLACEHOLDER_OPEN.len()..];
            let end = body_and_tail.find(PLACEHOLDER_CLOSE).ok_or_else(|| {
                SubstitutionError::Malformed {
                    snippet: rest[start..].chars().take(32).collect(),
                }
            })?;
            let body = &body_and_tail[..end];
            let (name, field) =
                body.split_once(':')
                    .ok_or_else(|| SubstitutionError::Malformed {
                        snippet: body.to_owned(),
                    })?;

            out.push_str(&self.resolve_field(name, field)?);
            rest = &body_and_tail[end + PLACEHOLDER_CLOSE.len()..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Resolve a whole command, whichever shape it holds.
    pub fn resolve_command(&self, command: &NodeCommand) -> Result<NodeCommand, SubstitutionError> {
        match command {
            NodeCommand::Tokens(tokens) => tokens
                .iter()
                .map(|token| self.resolve_str(token))
                .collect::<Result<Vec<_>, _>>()
                .map(NodeCommand::Tokens),
            NodeCommand::Line(line) => self.resolve_str(line).map(NodeCommand::Line),
        }
    }

    /// Rewrite a definition's command in place before it is handed to the
    /// execution client.
    pub fn apply_network_refs(
        &self,
        definition: &mut ResourceDefinition,
    ) -> Result<(), SubstitutionError> {
        definition.spec.command = self.resolve_command(&definition.spec.command)?;
        Ok(())
    }

    fn resolve_field(&self, name: &str, field: &str) -> Result<String, SubstitutionError> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let info = nodes.get(name).ok_or_else(|| SubstitutionError::UnknownNode {
            name: name.to_owned(),
        })?;

        match field {
            "address" => Ok(info.ws_endpoint()),
            "multiaddr" => Ok(info.multiaddr()),
            "peer-id" => Ok(info.peer_id.clone()),
            other => Err(SubstitutionError::UnknownField {
                name: name.to_owned(),
                field: other.to_owned(),
            }),
        }
    }
}
