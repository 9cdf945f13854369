//! Read-only chain queries used by test assertions.

use std::time::Duration;

use jsonrpsee::rpc_params;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::connect::{RpcClient, TransportError};

pub const CHAIN_GET_HEADER_METHOD: &str = "chain_getHeader";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid block number '{raw}' in header")]
    InvalidHeight { raw: String },
    #[error("height {min_height} not reached before timeout; last seen {last_seen:?}")]
    Timeout {
        min_height: u64,
        last_seen: Option<u64>,
    },
}

#[derive(Debug, Deserialize)]
struct Header {
    /// Hex-encoded block number, `0x`-prefixed.
    number: String,
}

/// Best block height of the node behind `endpoint`.
pub async fn best_block_height(endpoint: &str) -> Result<u64, QueryError> {
    let client = RpcClient::connect(endpoint).await?;
    best_height_via(&client).await
}

async fn best_height_via(client: &RpcClient) -> Result<u64, QueryError> {
    let header: Header = client.request(CHAIN_GET_HEADER_METHOD, rpc_params![]).await?;
    let raw = header.number.trim_start_matches("0x");
    u64::from_str_radix(raw, 16).map_err(|_| QueryError::InvalidHeight { raw: header.number })
}

/// Poll `endpoint` until its best block height reaches `min_height`.
/// Transient query failures within the window are tolerated; the deadline
/// converts the last failure or shortfall into [`QueryError::Timeout`].
pub async fn wait_for_block_height(
    endpoint: &str,
    min_height: u64,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> Result<(), QueryError> {
    let start = Instant::now();
    let mut last_seen = None;

    loop {
        match best_block_height(endpoint).await {
            Ok(height) => {
                if height >= min_height {
                    return Ok(());
                }
                last_seen = Some(height);
                debug!(height, min_height, "height not reached yet");
            }
            Err(err) => {
                debug!(error = %err, "height query failed, retrying until deadline");
            }
        }

        if start.elapsed() >= timeout_duration {
            return Err(QueryError::Timeout {
                min_height,
                last_seen,
            });
        }
        sleep(poll_interval).await;
    }
}
