//! In-process fake node endpoint backing the integration tests: serves the
//! runtime-upgrade method, the header query and a scripted system-event
//! stream over both ws and http.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use jsonrpsee::{
    core::StringError,
    server::{RpcModule, Server, ServerHandle},
    types::ErrorObjectOwned,
    SubscriptionMessage,
};
use serde_json::json;
use tokio::time::sleep;

pub struct FakeNode {
    // Held so the server keeps running for the test's lifetime.
    _handle: ServerHandle,
    addr: SocketAddr,
}

impl FakeNode {
    pub fn ws_endpoint(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn http_endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Fake node accepting upgrades, reporting a best height of 42 and
/// emitting an unrelated event 500 ms after subscription, then the
/// `UpgradeApplied` event at 1500 ms.
pub async fn spawn_fake_node() -> anyhow::Result<FakeNode> {
    let mut module = RpcModule::new(());

    module.register_method("admin_setRuntimeCode", |params, _ctx, _ext| {
        let code: String = params.one()?;
        if code.starts_with("0x") && code.len() > 2 {
            Ok(json!(true))
        } else {
            Err(ErrorObjectOwned::owned(
                -32602,
                "runtime code must be 0x-prefixed hex",
                None::<()>,
            ))
        }
    })?;

    module.register_method("chain_getHeader", |_params, _ctx, _ext| {
        json!({ "number": "0x2a" })
    })?;

    module.register_subscription(
        "system_subscribeEvents",
        "system_events",
        "system_unsubscribeEvents",
        |_params, pending, _ctx, _ext| async move {
            let sink = pending.accept().await?;

            sleep(Duration::from_millis(500)).await;
            sink.send(SubscriptionMessage::from_json(&json!({
                "name": "BlockImported",
                "data": { "height": 1 }
            }))?)
            .await?;

            sleep(Duration::from_millis(1000)).await;
            sink.send(SubscriptionMessage::from_json(&json!({
                "name": "UpgradeApplied",
                "data": { "spec_version": 2 }
            }))?)
            .await?;

            // Stay open until the watcher unsubscribes or disconnects.
            sink.closed().await;
            Ok::<(), StringError>(())
        },
    )?;

    serve(module).await
}

/// Fake node whose upgrade method rejects every submission at the RPC
/// level.
pub async fn spawn_upgrade_rejecting_node() -> anyhow::Result<FakeNode> {
    let mut module = RpcModule::new(());

    module.register_method("admin_setRuntimeCode", |_params, _ctx, _ext| {
        Err::<serde_json::Value, _>(ErrorObjectOwned::owned(
            -32000,
            "upgrade rejected by backend",
            None::<()>,
        ))
    })?;

    serve(module).await
}

async fn serve(module: RpcModule<()>) -> anyhow::Result<FakeNode> {
    let server = Server::builder().build("127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    Ok(FakeNode {
        _handle: server.start(module),
        addr,
    })
}

/// An endpoint nothing is listening on.
pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("probe bind");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    format!("ws://127.0.0.1:{port}")
}
