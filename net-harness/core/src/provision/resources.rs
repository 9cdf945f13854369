//! Backend-agnostic resource definitions, one per node.

use std::{collections::BTreeMap, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use super::{
    command::{synthesize, synthesize_relay_collator, NodeCommand},
    ports::{assign_node_ports, PortMapping},
};
use crate::nodes::{EnvVar, NodeRole, NodeSpec};

/// Value of the `app` label on every manifest produced by this harness.
pub const APP_LABEL: &str = "net-harness";

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to allocate a free host port: {source}")]
    PortAllocation {
        #[source]
        source: io::Error,
    },
    #[error("failed to stage directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    pub cfg_path: String,
    pub data_path: String,
    pub ports: Vec<PortMapping>,
    pub command: NodeCommand,
    pub env: Vec<EnvVar>,
}

/// What the execution client launches for one node. Produced once per
/// node; not mutated afterwards except by placeholder substitution on the
/// command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub metadata: Metadata,
    pub spec: ResourceSpec,
}

/// Builds resource definitions, staging per-node `cfg`/`data` directories
/// under one root.
pub struct ResourceBuilder {
    staging_root: PathBuf,
}

impl ResourceBuilder {
    #[must_use]
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
        }
    }

    /// Definition for a regular node. Steps, each failing independently:
    /// assign the four ports, stage the cfg/data directories, synthesize
    /// the role-appropriate command, assemble role-derived labels.
    pub async fn node_definition(
        &self,
        namespace: &str,
        node: &NodeSpec,
    ) -> Result<ResourceDefinition, ProvisionError> {
        let ports = assign_node_ports(node.rpc_port, node.ws_port, node.prometheus_port)
            .map_err(|source| ProvisionError::PortAllocation { source })?;
        let (cfg_path, data_path) = self.stage_node_dirs(&node.name).await?;

        let command = match node.role {
            Some(NodeRole::RelayCollator) => {
                synthesize_relay_collator(node, &cfg_path, &data_path, &ports)
            }
            Some(NodeRole::Bootnode | NodeRole::FullNode | NodeRole::Authority | NodeRole::Temp)
            | None => synthesize(node, &cfg_path, &data_path, &ports),
        };

        debug!(node = %node.name, namespace, role = node.role_label(), "built node definition");

        Ok(ResourceDefinition {
            metadata: Metadata {
                name: node.name.clone(),
                namespace: namespace.to_owned(),
                labels: node_labels(namespace, &node.name, node.role_label()),
            },
            spec: ResourceSpec {
                cfg_path,
                data_path,
                ports,
                command,
                env: node.env.clone(),
            },
        })
    }

    /// Definition for the network's bootnode. Fixed label set and always
    /// the generic synthesis path; collator launch variants do not apply
    /// to bootnodes.
    pub async fn bootnode_definition(
        &self,
        namespace: &str,
        node: &NodeSpec,
    ) -> Result<ResourceDefinition, ProvisionError> {
        let ports = assign_node_ports(node.rpc_port, node.ws_port, node.prometheus_port)
            .map_err(|source| ProvisionError::PortAllocation { source })?;
        let (cfg_path, data_path) = self.stage_node_dirs(&node.name).await?;

        let command = synthesize(node, &cfg_path, &data_path, &ports);

        debug!(node = %node.name, namespace, "built bootnode definition");

        Ok(ResourceDefinition {
            metadata: Metadata {
                name: "bootnode".to_owned(),
                namespace: namespace.to_owned(),
                labels: node_labels(namespace, "bootnode", NodeRole::Bootnode.label()),
            },
            spec: ResourceSpec {
                cfg_path,
                data_path,
                ports,
                command,
                env: node.env.clone(),
            },
        })
    }

    /// Create `<root>/<name>/cfg` and `<root>/<name>/data`, a no-op when
    /// they already exist so a retried build never fails here.
    async fn stage_node_dirs(&self, name: &str) -> Result<(String, String), ProvisionError> {
        let cfg_dir = self.staging_root.join(name).join("cfg");
        let data_dir = self.staging_root.join(name).join("data");

        for dir in [&cfg_dir, &data_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| ProvisionError::Staging {
                    path: dir.clone(),
                    source,
                })?;
        }

        Ok((
            cfg_dir.display().to_string(),
            data_dir.display().to_string(),
        ))
    }
}

fn node_labels(namespace: &str, instance: &str, role: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_owned(), APP_LABEL.to_owned()),
        ("name".to_owned(), namespace.to_owned()),
        ("instance".to_owned(), instance.to_owned()),
        ("node-role".to_owned(), role.to_owned()),
        ("harness-ns".to_owned(), namespace.to_owned()),
    ])
}
