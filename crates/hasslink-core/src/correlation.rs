// ── Request/reply correlation ──
//
// Ids are allocated per connection attempt, starting at 1. A pending
// request listens on the attempt's inbound broadcast and picks out the
// messages carrying its id. When the attempt closes, its broadcast
// sender is dropped and every pending request fails with
// `ConnectionClosed`.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use hasslink_api::InboundMessage;

use crate::error::CoreError;

// ── IdSequence ──────────────────────────────────────────────────────

/// Strictly increasing ids for one attempt.
#[derive(Debug)]
pub(crate) struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

// ── PendingRequest ──────────────────────────────────────────────────

/// A request that has been sent and is waiting for correlated messages.
///
/// The receiver is subscribed before the request is sent, so the reply
/// can never be missed. Requests with a single reply use
/// [`reply`](Self::reply); subscriptions keep calling
/// [`next_message`](Self::next_message) for every notification.
#[derive(Debug)]
pub struct PendingRequest {
    id: u64,
    attempt: u64,
    inbound: broadcast::Receiver<Arc<InboundMessage>>,
}

impl PendingRequest {
    pub(crate) fn new(
        id: u64,
        attempt: u64,
        inbound: broadcast::Receiver<Arc<InboundMessage>>,
    ) -> Self {
        Self {
            id,
            attempt,
            inbound,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Attempt the request was sent on.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Wait for the first message carrying this request's id.
    ///
    /// Fails with [`CoreError::ReplyLost`] if the listener lags, since the
    /// dropped messages may include the reply.
    pub async fn reply(mut self) -> Result<Arc<InboundMessage>, CoreError> {
        self.recv_matching(true).await
    }

    /// Wait for the next message carrying this request's id.
    ///
    /// Messages for other ids are skipped. A lagging listener logs the gap
    /// and keeps going. Fails with [`CoreError::ConnectionClosed`] once the
    /// attempt has closed.
    pub async fn next_message(&mut self) -> Result<Arc<InboundMessage>, CoreError> {
        self.recv_matching(false).await
    }

    async fn recv_matching(&mut self, fail_on_lag: bool) -> Result<Arc<InboundMessage>, CoreError> {
        loop {
            match self.inbound.recv().await {
                Ok(message) if message.id == Some(self.id) => return Ok(message),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        attempt = self.attempt,
                        id = self.id,
                        skipped,
                        "inbound listener lagged, messages dropped"
                    );
                    if fail_on_lag {
                        return Err(CoreError::ReplyLost { id: self.id });
                    }
                }
                Err(RecvError::Closed) => {
                    debug!(attempt = self.attempt, id = self.id, "attempt closed while waiting");
                    return Err(CoreError::ConnectionClosed);
                }
            }
        }
    }
}
