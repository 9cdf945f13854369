//! Provisioning core for ephemeral multi-node ledger test networks.
//!
//! Translates declarative [`nodes::NodeSpec`]s into backend-agnostic
//! [`provision::ResourceDefinition`]s and keeps a live [`topology::Network`]
//! model of the running cluster so later nodes can reference the addresses
//! of earlier ones. Launching the manifests is the job of an external
//! [`scenario::ExecutionClient`].

pub mod nodes;
pub mod provision;
pub mod scenario;
pub mod topology;
