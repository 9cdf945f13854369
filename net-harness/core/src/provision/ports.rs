//! Host-port allocation for node manifests.

use std::{io, net::TcpListener};

use serde::{Deserialize, Serialize};

/// Fixed in-container port of the prometheus scrape endpoint.
pub const PROMETHEUS_PORT: u16 = 9615;
/// Fixed in-container port of the HTTP RPC endpoint.
pub const RPC_HTTP_PORT: u16 = 9933;
/// Fixed in-container port of the WebSocket RPC endpoint.
pub const RPC_WS_PORT: u16 = 9944;
/// Fixed in-container port of the p2p transport.
pub const P2P_PORT: u16 = 30333;

/// One exposed service port of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub name: String,
    /// CLI flag used to point the node at `host_port`.
    pub flag: String,
    pub host_port: u16,
}

impl PortMapping {
    fn new(container_port: u16, name: &str, flag: &str, host_port: u16) -> Self {
        Self {
            container_port,
            name: name.to_owned(),
            flag: flag.to_owned(),
            host_port,
        }
    }
}

/// A free host port, probed by binding an ephemeral TCP socket and
/// releasing it. The port is not reserved: a race against the eventual
/// user of the port exists and is accepted for this harness.
pub fn random_free_port() -> io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// The four port mappings of one node, in fixed order: prometheus,
/// rpc-http, rpc-ws, p2p. Explicit host ports are honored for the first
/// three; the p2p host port is always allocated (there is no override
/// field for it).
pub fn assign_node_ports(
    rpc: Option<u16>,
    ws: Option<u16>,
    prometheus: Option<u16>,
) -> io::Result<Vec<PortMapping>> {
    let prometheus_host = match prometheus {
        Some(port) => port,
        None => random_free_port()?,
    };
    let rpc_host = match rpc {
        Some(port) => port,
        None => random_free_port()?,
    };
    let ws_host = match ws {
        Some(port) => port,
        None => random_free_port()?,
    };
    let p2p_host = random_free_port()?;

    Ok(vec![
        PortMapping::new(
            PROMETHEUS_PORT,
            "prometheus",
            "--prometheus-port",
            prometheus_host,
        ),
        PortMapping::new(RPC_HTTP_PORT, "rpc-http", "--rpc-port", rpc_host),
        PortMapping::new(RPC_WS_PORT, "rpc-ws", "--ws-port", ws_host),
        PortMapping::new(P2P_PORT, "p2p", "--port", p2p_host),
    ])
}
