//! Full provisioning flow: build a bootnode manifest, register its runtime
//! identity, then build a follower whose bootnode reference resolves
//! against the live topology.

use std::net::{IpAddr, Ipv4Addr};

use net_harness_core::{
    nodes::NodeSpec,
    provision::{NodeCommand, ResourceBuilder},
    topology::{generate_namespace, Network, NodeRuntimeInfo},
};

fn host_port(def: &net_harness_core::provision::ResourceDefinition, name: &str) -> u16 {
    def.spec
        .ports
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("port {name} missing"))
        .host_port
}

#[tokio::test]
async fn follower_resolves_bootnode_address_once_registered() {
    let staging = tempfile::tempdir().expect("staging root");
    let builder = ResourceBuilder::new(staging.path());
    let namespace = generate_namespace();
    let network = Network::new(namespace.clone());

    let bootnode_spec = NodeSpec::new("bootnode", "ledger:latest", "dev");
    let bootnode_def = builder
        .bootnode_definition(&namespace, &bootnode_spec)
        .await
        .expect("bootnode definition");

    // What the execution client would report back after launching it.
    network.register(
        "bootnode",
        NodeRuntimeInfo {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            peer_id: "12D3KooWBootPeer".to_owned(),
            rpc_port: host_port(&bootnode_def, "rpc-http"),
            ws_port: host_port(&bootnode_def, "rpc-ws"),
            prometheus_port: host_port(&bootnode_def, "prometheus"),
            p2p_port: host_port(&bootnode_def, "p2p"),
        },
    );

    let follower_spec = NodeSpec::new("alice", "ledger:latest", "dev")
        .with_validator(true)
        .with_bootnodes(vec!["{{net:bootnode:multiaddr}}".to_owned()]);
    let mut follower_def = builder
        .node_definition(&namespace, &follower_spec)
        .await
        .expect("follower definition");

    network
        .apply_network_refs(&mut follower_def)
        .expect("bootnode is registered, so the reference resolves");

    let NodeCommand::Tokens(tokens) = &follower_def.spec.command else {
        panic!("follower command must be a token sequence");
    };
    let bootnode_arg = tokens
        .iter()
        .find(|t| t.starts_with("/ip4/"))
        .expect("resolved bootnode multiaddr in command");
    assert!(bootnode_arg.ends_with("/p2p/12D3KooWBootPeer"));
    assert!(!tokens.iter().any(|t| t.contains("{{net:")));

    // A second pass over the already-resolved definition changes nothing.
    let before = follower_def.clone();
    network
        .apply_network_refs(&mut follower_def)
        .expect("substitution is idempotent");
    assert_eq!(before, follower_def);
}
