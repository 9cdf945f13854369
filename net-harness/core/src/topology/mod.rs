//! Live model of a running network.

pub mod network;

pub use network::{Network, NodeRuntimeInfo, SubstitutionError};

use rand::{thread_rng, Rng as _};

/// Random hex namespace for one test-network run.
#[must_use]
pub fn generate_namespace() -> String {
    let mut buf = [0u8; 16];
    thread_rng().fill(&mut buf);
    hex::encode(buf)
}
