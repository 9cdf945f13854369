//! Endpoint validation and deadline-bounded RPC clients.

use std::time::Duration;

use jsonrpsee::{
    core::{client::ClientT, params::ArrayParams},
    http_client::{HttpClient, HttpClientBuilder},
    ws_client::{WsClient, WsClientBuilder},
};
use net_harness_env as nh_env;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::timeout;
use tracing::trace;
use url::Url;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures of the RPC channel itself. Callers may retry these; they are
/// deliberately distinct from validation failures, which retrying cannot
/// fix.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("unsupported scheme '{scheme}' in '{endpoint}' (expected {expected})")]
    UnsupportedScheme {
        endpoint: String,
        scheme: String,
        expected: &'static str,
    },
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },
    #[error("rpc call failed: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),
    #[error("failed to decode notification payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("event stream closed by the remote end")]
    StreamClosed,
}

/// Endpoint usable for event subscriptions: `ws:` or `wss:` only.
pub fn parse_ws_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let url = parse_endpoint(endpoint)?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(TransportError::UnsupportedScheme {
            endpoint: endpoint.to_owned(),
            scheme: scheme.to_owned(),
            expected: "ws/wss",
        }),
    }
}

/// Endpoint usable for plain RPC: websocket or http flavors.
pub fn parse_rpc_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let url = parse_endpoint(endpoint)?;
    match url.scheme() {
        "ws" | "wss" | "http" | "https" => Ok(url),
        scheme => Err(TransportError::UnsupportedScheme {
            endpoint: endpoint.to_owned(),
            scheme: scheme.to_owned(),
            expected: "ws/wss/http/https",
        }),
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    Url::parse(endpoint).map_err(|source| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })
}

/// WebSocket client with bounded connect and per-request timeouts.
pub async fn connect_ws(endpoint: &str) -> Result<WsClient, TransportError> {
    let url = parse_ws_endpoint(endpoint)?;
    build_ws(url.as_str()).await
}

async fn build_ws(endpoint: &str) -> Result<WsClient, TransportError> {
    let connect_timeout = nh_env::adjust_timeout(DEFAULT_CONNECT_TIMEOUT);
    let builder =
        WsClientBuilder::default().request_timeout(nh_env::adjust_timeout(DEFAULT_REQUEST_TIMEOUT));

    match timeout(connect_timeout, builder.build(endpoint)).await {
        Ok(Ok(client)) => Ok(client),
        Ok(Err(err)) => Err(TransportError::Connect {
            endpoint: endpoint.to_owned(),
            message: err.to_string(),
        }),
        Err(_) => Err(TransportError::Connect {
            endpoint: endpoint.to_owned(),
            message: "connect timed out".to_owned(),
        }),
    }
}

fn build_http(endpoint: &str) -> Result<HttpClient, TransportError> {
    HttpClientBuilder::default()
        .request_timeout(nh_env::adjust_timeout(DEFAULT_REQUEST_TIMEOUT))
        .build(endpoint)
        .map_err(|err| TransportError::Connect {
            endpoint: endpoint.to_owned(),
            message: err.to_string(),
        })
}

/// RPC client over whichever transport the endpoint scheme selects.
pub enum RpcClient {
    Ws(WsClient),
    Http(HttpClient),
}

impl RpcClient {
    pub async fn connect(endpoint: &str) -> Result<Self, TransportError> {
        let url = parse_rpc_endpoint(endpoint)?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self::Ws(build_ws(url.as_str()).await?)),
            // parse_rpc_endpoint only lets http/https through here.
            _ => Ok(Self::Http(build_http(url.as_str())?)),
        }
    }

    pub async fn request<R>(&self, method: &str, params: ArrayParams) -> Result<R, TransportError>
    where
        R: DeserializeOwned,
    {
        trace!(method, "issuing rpc request");
        let result = match self {
            Self::Ws(client) => client.request(method, params).await,
            Self::Http(client) => client.request(method, params).await,
        };
        result.map_err(TransportError::Rpc)
    }
}
