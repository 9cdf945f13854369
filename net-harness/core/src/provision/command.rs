//! Launch-line synthesis per node role.

use serde::{Deserialize, Serialize};

use super::{
    binary::{DEFAULT_COLLATOR_COMMAND, DEFAULT_NODE_COMMAND},
    ports::PortMapping,
};
use crate::nodes::{NodeRole, NodeSpec};

/// A synthesized launch command: either an argv-style token sequence or a
/// single verbatim line (temp utility nodes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeCommand {
    Tokens(Vec<String>),
    Line(String),
}

impl NodeCommand {
    /// Iterate the command's string parts, whichever shape it holds.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::Tokens(tokens) => Parts::Tokens(tokens.iter()),
            Self::Line(line) => Parts::Line(std::iter::once(line.as_str())),
        }
    }
}

enum Parts<'a> {
    Tokens(std::slice::Iter<'a, String>),
    Line(std::iter::Once<&'a str>),
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self {
            Self::Tokens(iter) => iter.next().map(String::as_str),
            Self::Line(iter) => iter.next(),
        }
    }
}

/// Generic launch line for a node: explicit binary override or the default
/// node binary, followed by chain selector, directory flags, the four port
/// overrides, validator flag, bootnodes and caller args.
///
/// Output is deterministic: identical inputs and port assignments produce a
/// byte-identical command on every call.
#[must_use]
pub fn synthesize(
    node: &NodeSpec,
    cfg_path: &str,
    data_path: &str,
    ports: &[PortMapping],
) -> NodeCommand {
    if let Some(line) = &node.full_command {
        // Temp utility nodes carry a verbatim launch line; nothing is
        // appended to it.
        return NodeCommand::Line(line.clone());
    }

    let binary = node.command.as_deref().unwrap_or(DEFAULT_NODE_COMMAND);
    NodeCommand::Tokens(flag_tokens(node, binary, cfg_path, data_path, ports, true))
}

/// Relay-chain collator variant: an outer collator invocation wrapping an
/// inner relay-chain client command after a `--` separator. The inner
/// command reuses the generic flag construction, so port overrides and
/// bootnodes land on the relay side.
#[must_use]
pub fn synthesize_relay_collator(
    node: &NodeSpec,
    cfg_path: &str,
    data_path: &str,
    ports: &[PortMapping],
) -> NodeCommand {
    let collator_binary = node.command.as_deref().unwrap_or(DEFAULT_COLLATOR_COMMAND);

    let mut tokens = vec![
        collator_binary.to_owned(),
        "--name".to_owned(),
        node.name.clone(),
        "--chain".to_owned(),
        node.chain.clone(),
        "--base-path".to_owned(),
        data_path.to_owned(),
    ];
    tokens.extend(node.args.iter().cloned());
    tokens.push("--".to_owned());
    tokens.extend(flag_tokens(
        node,
        DEFAULT_NODE_COMMAND,
        cfg_path,
        data_path,
        ports,
        false,
    ));

    NodeCommand::Tokens(tokens)
}

fn flag_tokens(
    node: &NodeSpec,
    binary: &str,
    cfg_path: &str,
    data_path: &str,
    ports: &[PortMapping],
    with_caller_args: bool,
) -> Vec<String> {
    let mut tokens = vec![
        binary.to_owned(),
        "--chain".to_owned(),
        node.chain.clone(),
        "--name".to_owned(),
        node.name.clone(),
        "--config-dir".to_owned(),
        cfg_path.to_owned(),
        "--base-path".to_owned(),
        data_path.to_owned(),
    ];

    // Port flags in the fixed port-vector order keeps output reproducible.
    for port in ports {
        tokens.push(port.flag.clone());
        tokens.push(port.host_port.to_string());
    }

    if is_authority(node) {
        tokens.push("--validator".to_owned());
    }

    for bootnode in &node.bootnodes {
        tokens.push("--bootnodes".to_owned());
        tokens.push(bootnode.clone());
    }

    if let Some(url) = &node.telemetry_url {
        tokens.push("--telemetry-url".to_owned());
        tokens.push(url.clone());
    }

    if with_caller_args {
        tokens.extend(node.args.iter().cloned());
    }

    tokens
}

fn is_authority(node: &NodeSpec) -> bool {
    match node.role {
        Some(NodeRole::Authority) => true,
        Some(
            NodeRole::Bootnode | NodeRole::FullNode | NodeRole::RelayCollator | NodeRole::Temp,
        ) => false,
        None => node.validator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::ports::assign_node_ports;

    fn sample_node() -> NodeSpec {
        NodeSpec::new("alice", "ledger:latest", "dev")
            .with_validator(true)
            .with_bootnodes(vec!["{{net:bootnode:multiaddr}}".to_owned()])
            .with_args(vec!["--log".to_owned(), "debug".to_owned()])
    }

    #[test]
    fn synthesis_is_deterministic() {
        let node = sample_node();
        let ports = assign_node_ports(Some(40_100), Some(40_101), Some(40_102)).expect("ports");

        let first = synthesize(&node, "/tmp/alice/cfg", "/tmp/alice/data", &ports);
        let second = synthesize(&node, "/tmp/alice/cfg", "/tmp/alice/data", &ports);
        assert_eq!(first, second);
    }

    #[test]
    fn generic_command_carries_flags_in_order() {
        let node = sample_node();
        let ports = assign_node_ports(Some(40_200), Some(40_201), Some(40_202)).expect("ports");

        let NodeCommand::Tokens(tokens) =
            synthesize(&node, "/tmp/alice/cfg", "/tmp/alice/data", &ports)
        else {
            panic!("generic synthesis must produce a token sequence");
        };

        assert_eq!(tokens[0], DEFAULT_NODE_COMMAND);
        let chain_at = tokens.iter().position(|t| t == "--chain").expect("chain");
        assert_eq!(tokens[chain_at + 1], "dev");
        assert!(tokens.contains(&"--validator".to_owned()));
        assert!(tokens.contains(&"{{net:bootnode:multiaddr}}".to_owned()));

        let prometheus_at = tokens
            .iter()
            .position(|t| t == "--prometheus-port")
            .expect("prometheus flag");
        assert_eq!(tokens[prometheus_at + 1], "40202");
    }

    #[test]
    fn full_command_passes_through_verbatim() {
        let node = NodeSpec::temp("ledger:latest", "dev", "ledger-node purge-chain --yes");
        let ports = assign_node_ports(None, None, None).expect("ports");

        let command = synthesize(&node, "/tmp/t/cfg", "/tmp/t/data", &ports);
        assert_eq!(
            command,
            NodeCommand::Line("ledger-node purge-chain --yes".to_owned())
        );
    }

    #[test]
    fn collator_command_nests_relay_client_after_separator() {
        let mut node = sample_node().with_role(NodeRole::RelayCollator);
        node.command = Some("parachain-collator".to_owned());
        let ports = assign_node_ports(None, None, None).expect("ports");

        let NodeCommand::Tokens(tokens) =
            synthesize_relay_collator(&node, "/tmp/alice/cfg", "/tmp/alice/data", &ports)
        else {
            panic!("collator synthesis must produce a token sequence");
        };

        assert_eq!(tokens[0], "parachain-collator");
        let separator = tokens.iter().position(|t| t == "--").expect("separator");
        assert_eq!(tokens[separator + 1], DEFAULT_NODE_COMMAND);
        // Port overrides belong to the inner relay command.
        assert!(tokens[separator..].contains(&"--ws-port".to_owned()));
        assert!(!tokens[..separator].contains(&"--ws-port".to_owned()));
    }
}
