//! Turning a [`crate::nodes::NodeSpec`] into a launchable manifest:
//! port assignment, command synthesis and resource-definition assembly.

mod binary;
mod command;
mod ports;
mod resources;
mod staging;

pub use binary::{BinaryLocator, DEFAULT_COLLATOR_COMMAND, DEFAULT_NODE_COMMAND};
pub use command::{synthesize, synthesize_relay_collator, NodeCommand};
pub use ports::{
    assign_node_ports, random_free_port, PortMapping, P2P_PORT, PROMETHEUS_PORT, RPC_HTTP_PORT,
    RPC_WS_PORT,
};
pub use resources::{
    Metadata, ProvisionError, ResourceBuilder, ResourceDefinition, ResourceSpec, APP_LABEL,
};
pub use staging::create_staging_root;
