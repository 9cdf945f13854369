//! Locating the node binary for native (bare-process) backends.

use std::{env, path::PathBuf};

use net_harness_env as nh_env;

/// Binary invoked by synthesized node commands when no override is set.
pub const DEFAULT_NODE_COMMAND: &str = "ledger-node";
/// Outer binary of the relay-chain collator launch variant.
pub const DEFAULT_COLLATOR_COMMAND: &str = "ledger-collator";

/// Resolves a binary name to a concrete path for the execution client:
/// env override first, then `PATH`, then the bare name (left to the
/// backend's own lookup).
pub struct BinaryLocator;

impl BinaryLocator {
    #[must_use]
    pub fn resolve(binary_name: &str) -> PathBuf {
        if let Some(path) = nh_env::node_binary_override() {
            return path;
        }
        if let Some(path) = Self::which_on_path(binary_name) {
            return path;
        }
        PathBuf::from(binary_name)
    }

    fn which_on_path(bin: &str) -> Option<PathBuf> {
        let path_env = env::var_os("PATH")?;
        env::split_paths(&path_env)
            .map(|p| p.join(bin))
            .find(|candidate| candidate.is_file())
    }
}
