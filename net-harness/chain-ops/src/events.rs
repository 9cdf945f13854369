//! Watching a node's system-event stream for a matching event.

use std::time::Duration;

use jsonrpsee::{
    core::client::{Subscription, SubscriptionClientT},
    rpc_params,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::connect::{connect_ws, TransportError};

pub const EVENTS_SUBSCRIBE_METHOD: &str = "system_subscribeEvents";
pub const EVENTS_UNSUBSCRIBE_METHOD: &str = "system_unsubscribeEvents";

/// One structured notification from a node's event stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemEvent {
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// How a watch resolved. A deadline with no match is a legitimate negative
/// assertion result, not an error.
#[derive(Debug)]
pub enum WatchOutcome {
    Matched(SystemEvent),
    TimedOut,
}

impl WatchOutcome {
    #[must_use]
    pub const fn matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Subscribe to `endpoint`'s system-event stream and resolve on the first
/// event satisfying `predicate`, or when `deadline` elapses.
///
/// Exactly one resolution per watch; the subscription is released on both
/// exit paths. Independent watches own independent subscriptions and do
/// not interfere, whether or not they target the same endpoint.
pub async fn watch_system_events<P>(
    endpoint: &str,
    mut predicate: P,
    deadline: Duration,
) -> Result<WatchOutcome, WatchError>
where
    P: FnMut(&SystemEvent) -> bool + Send,
{
    let client = connect_ws(endpoint).await?;
    let mut subscription: Subscription<SystemEvent> = client
        .subscribe(
            EVENTS_SUBSCRIBE_METHOD,
            rpc_params![],
            EVENTS_UNSUBSCRIBE_METHOD,
        )
        .await
        .map_err(TransportError::Rpc)?;

    let deadline_at = Instant::now() + deadline;
    let outcome = loop {
        match timeout_at(deadline_at, subscription.next()).await {
            // Deadline elapsed without a match: a negative result, not a
            // transport problem.
            Err(_) => break WatchOutcome::TimedOut,
            Ok(None) => return Err(TransportError::StreamClosed.into()),
            Ok(Some(Err(err))) => return Err(TransportError::Decode(err).into()),
            Ok(Some(Ok(event))) => {
                if predicate(&event) {
                    break WatchOutcome::Matched(event);
                }
                debug!(event = %event.name, "event did not match, waiting for the next one");
            }
        }
    };

    if let Err(err) = subscription.unsubscribe().await {
        // The watch already resolved; a failed unsubscribe only matters
        // for server-side bookkeeping.
        debug!(endpoint, error = %err, "unsubscribe after watch resolution failed");
    }

    Ok(outcome)
}
