// ── Derived entity streams ──
//
// Each subscriber gets its own lazy pipeline bound to whichever attempt
// is authenticated: fetch the full state (snapshot phase), then follow
// the live subscription. When the attempt closes the pipeline waits for
// the next authenticated attempt and starts over, so a reconnect shows
// up as a fresh snapshot followed by live updates. The stream ends when
// the connector stops.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use hasslink_api::Request;

use crate::convert;
use crate::correlation::PendingRequest;
use crate::model::{EntityEvent, EntityState};
use crate::supervisor::WorkerLink;

/// Event type of entity state changes.
pub const STATE_CHANGED_EVENT: &str = "state_changed";

/// A stream of values derived from the connection.
///
/// Nothing is requested from the hub until the stream is first polled.
pub struct ConnectorStream<T> {
    inner: Pin<Box<dyn Stream<Item = T> + Send + 'static>>,
}

/// Snapshot-then-live entity state changes.
pub type EntityStateStream = ConnectorStream<EntityState>;

/// Device-originated entity events.
pub type EntityEventStream = ConnectorStream<EntityEvent>;

impl<T> ConnectorStream<T> {
    fn new(inner: impl Stream<Item = T> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }

    /// Wait for the next item. Returns `None` once the connector stopped.
    pub async fn recv(&mut self) -> Option<T> {
        self.inner.next().await
    }
}

impl<T> Stream for ConnectorStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

// ── Pipelines ───────────────────────────────────────────────────────

pub(crate) fn entity_states(link: WorkerLink) -> EntityStateStream {
    ConnectorStream::new(async_stream::stream! {
        let mut link = link;
        let mut last_attempt = 0;

        while let Ok(attempt) = link.authenticated_after(last_attempt).await {
            last_attempt = attempt;
            info!(attempt, "authenticated, fetching entity states");

            // Snapshot phase.
            let snapshot = match link.dispatch(attempt, Request::GetStates).await {
                Ok(pending) => pending.reply().await,
                Err(e) => Err(e),
            };
            match snapshot {
                Ok(reply) if reply.is_failure() => {
                    warn!(attempt, error = ?reply.error, "state fetch rejected");
                }
                Ok(reply) => {
                    let states = convert::entity_states_from_result(&reply);
                    debug!(attempt, count = states.len(), "state snapshot received");
                    for state in states {
                        yield state;
                    }
                }
                Err(e) => {
                    debug!(attempt, error = %e, "state fetch interrupted");
                    continue;
                }
            }

            // Live phase.
            let Some(mut feed) = subscribe(&link, attempt, STATE_CHANGED_EVENT).await else {
                continue;
            };
            while let Ok(message) = feed.next_message().await {
                if let Some(state) = message.event_data().and_then(convert::entity_state_from_json) {
                    yield state;
                }
            }
            debug!(attempt, "state feed ended");
        }
        debug!("entity state stream finished");
    })
}

pub(crate) fn entity_events(link: WorkerLink, event_type: String) -> EntityEventStream {
    ConnectorStream::new(async_stream::stream! {
        let mut link = link;
        let mut last_attempt = 0;

        while let Ok(attempt) = link.authenticated_after(last_attempt).await {
            last_attempt = attempt;
            info!(attempt, event_type = %event_type, "authenticated, subscribing to entity events");

            let Some(mut feed) = subscribe(&link, attempt, &event_type).await else {
                continue;
            };
            while let Ok(message) = feed.next_message().await {
                if let Some(event) = message.event_data().and_then(convert::entity_event_from_json) {
                    yield event;
                }
            }
            debug!(attempt, "event feed ended");
        }
        debug!("entity event stream finished");
    })
}

/// Send `subscribe_events` and hand back the pending request, which then
/// carries every matching notification. `None` if the attempt is gone.
async fn subscribe(link: &WorkerLink, attempt: u64, event_type: &str) -> Option<PendingRequest> {
    let request = Request::SubscribeEvents {
        event_type: event_type.to_owned(),
    };
    match link.dispatch(attempt, request).await {
        Ok(pending) => Some(pending),
        Err(e) => {
            debug!(attempt, event_type, error = %e, "subscription not sent");
            None
        }
    }
}
