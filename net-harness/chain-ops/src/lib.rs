//! Operations against a live test-network node over its RPC channel:
//! runtime upgrades, system-event assertions and chain queries.
//!
//! Everything here is deadline-bounded; a hung node never hangs the
//! caller. Nothing retries: retry policy belongs to the test harness
//! layered above.

pub mod connect;
pub mod events;
pub mod queries;
pub mod upgrade;

pub use connect::{connect_ws, parse_rpc_endpoint, parse_ws_endpoint, RpcClient, TransportError};
pub use events::{watch_system_events, SystemEvent, WatchError, WatchOutcome};
pub use queries::{best_block_height, wait_for_block_height, QueryError};
pub use upgrade::{
    submit_runtime_upgrade, upgrade_from_hex_patch, upgrade_from_local_file, upgrade_from_url,
    validate_runtime_blob, RuntimeValidationError, UpgradeError,
};
