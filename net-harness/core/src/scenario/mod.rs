//! Contract between the provisioning core and the backend-specific
//! execution client (process spawner, container or cluster client).

use std::net::IpAddr;

use async_trait::async_trait;

use crate::provision::ResourceDefinition;

pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Runtime identity of a node the execution client launched.
#[derive(Clone, Debug)]
pub struct LaunchedNode {
    pub name: String,
    pub ip: IpAddr,
    pub peer_id: String,
}

/// Launches resource definitions on some backend. The core only builds
/// manifests and registers the returned identities in the topology; it
/// never spawns or watches processes itself.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn launch(&self, definition: &ResourceDefinition) -> Result<LaunchedNode, DynError>;
}
