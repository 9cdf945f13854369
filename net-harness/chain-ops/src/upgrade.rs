//! Validating and submitting runtime upgrades to a live node.
//!
//! Three sources normalize to one in-memory blob: a local file, a remote
//! URL, or an inline hex patch. The blob is validated before any
//! connection is opened; submission is a single fire-and-wait RPC call
//! with no retry. Submitting the same blob twice is the caller's business
//! and backend-defined.

use std::path::{Path, PathBuf};

use jsonrpsee::rpc_params;
use thiserror::Error;
use tracing::{debug, info};

use crate::connect::{RpcClient, TransportError};

/// RPC method accepting the hex-encoded replacement runtime.
pub const RUNTIME_UPGRADE_METHOD: &str = "admin_setRuntimeCode";

const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// The blob itself is unusable; retrying submission cannot help.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeValidationError {
    #[error("runtime blob is empty")]
    EmptyBlob,
    #[error("runtime blob does not start with the wasm magic bytes")]
    BadMagic,
}

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("runtime validation failed: {0}")]
    Validation(#[from] RuntimeValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to read runtime from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch runtime from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid hex patch: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Cheap sanity check run before submission is attempted: non-empty and
/// carrying the wasm magic.
pub fn validate_runtime_blob(blob: &[u8]) -> Result<(), RuntimeValidationError> {
    if blob.is_empty() {
        return Err(RuntimeValidationError::EmptyBlob);
    }
    if blob.len() < WASM_MAGIC.len() || blob[..WASM_MAGIC.len()] != WASM_MAGIC {
        return Err(RuntimeValidationError::BadMagic);
    }
    Ok(())
}

/// Upgrade from a runtime binary on the harness host.
pub async fn upgrade_from_local_file(
    endpoint: &str,
    path: impl AsRef<Path>,
) -> Result<(), UpgradeError> {
    let path = path.as_ref();
    let blob = tokio::fs::read(path).await.map_err(|source| UpgradeError::Io {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), bytes = blob.len(), "loaded runtime from file");
    upgrade_with_blob(endpoint, &blob).await
}

/// Upgrade from a runtime binary fetched over HTTP(S).
pub async fn upgrade_from_url(endpoint: &str, url: &str) -> Result<(), UpgradeError> {
    let response = reqwest::get(url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|source| UpgradeError::Fetch {
            url: url.to_owned(),
            source,
        })?;
    let blob = response.bytes().await.map_err(|source| UpgradeError::Fetch {
        url: url.to_owned(),
        source,
    })?;
    debug!(url, bytes = blob.len(), "fetched runtime from url");
    upgrade_with_blob(endpoint, &blob).await
}

/// Upgrade from an inline hex-encoded patch (with or without `0x`).
pub async fn upgrade_from_hex_patch(endpoint: &str, hex_patch: &str) -> Result<(), UpgradeError> {
    let raw = hex_patch.strip_prefix("0x").unwrap_or(hex_patch);
    let blob = hex::decode(raw)?;
    debug!(bytes = blob.len(), "decoded runtime hex patch");
    upgrade_with_blob(endpoint, &blob).await
}

async fn upgrade_with_blob(endpoint: &str, blob: &[u8]) -> Result<(), UpgradeError> {
    // Validation failures never reach the wire.
    validate_runtime_blob(blob)?;
    submit_runtime_upgrade(endpoint, blob).await
}

/// One-shot submission of an already-validated blob. Waits for the node's
/// acknowledgment; connect failures and RPC-level rejections surface as
/// [`UpgradeError::Transport`].
pub async fn submit_runtime_upgrade(endpoint: &str, blob: &[u8]) -> Result<(), UpgradeError> {
    let client = RpcClient::connect(endpoint).await?;
    let payload = format!("0x{}", hex::encode(blob));

    let ack: serde_json::Value = client
        .request(RUNTIME_UPGRADE_METHOD, rpc_params![payload])
        .await?;
    info!(endpoint, bytes = blob.len(), ?ack, "runtime upgrade acknowledged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_is_rejected() {
        assert_eq!(
            validate_runtime_blob(&[]),
            Err(RuntimeValidationError::EmptyBlob)
        );
    }

    #[test]
    fn bad_magic_is_rejected() {
        assert_eq!(
            validate_runtime_blob(b"not-wasm"),
            Err(RuntimeValidationError::BadMagic)
        );
        // Shorter than the magic itself.
        assert_eq!(
            validate_runtime_blob(&[0x00]),
            Err(RuntimeValidationError::BadMagic)
        );
    }

    #[test]
    fn wasm_magic_passes() {
        assert_eq!(
            validate_runtime_blob(b"\0asm\x01\x00\x00\x00"),
            Ok(())
        );
    }

    #[tokio::test]
    async fn invalid_blob_never_attempts_submission() {
        // Port 1 is never listening; a connection attempt would surface as
        // Transport, so getting Validation back proves the short-circuit.
        let err = upgrade_from_hex_patch("ws://127.0.0.1:1", "0xdeadbeef")
            .await
            .expect_err("bad magic must fail");
        assert!(matches!(err, UpgradeError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_hex_is_its_own_failure() {
        let err = upgrade_from_hex_patch("ws://127.0.0.1:1", "0xnot-hex")
            .await
            .expect_err("bad hex must fail");
        assert!(matches!(err, UpgradeError::HexDecode(_)));
    }
}
