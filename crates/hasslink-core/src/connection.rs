// ── Connection attempt state machine ──
//
// One `ConnectionAttempt` per socket. Lifecycle:
//
//   OPENING ──opened──▶ OPEN ──auth_ok──▶ AUTHENTICATED
//      │                 │                     │
//      └──── closing / closed / failure / auth rejected ──▶ CLOSED
//
// CLOSED is terminal; recovery means a new attempt. All transitions run
// synchronously on the worker task that owns the attempt, so the type is
// plain data plus a transport handle and can be driven directly in tests.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use strum::Display;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use hasslink_api::protocol::{encode_auth, encode_request};
use hasslink_api::{AuthPhase, InboundMessage, Request, TransportEvent, TransportHandle};

use crate::correlation::{IdSequence, PendingRequest};
use crate::error::CoreError;

// ── States ──────────────────────────────────────────────────────────

/// Lifecycle state of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptState {
    /// Socket requested, not yet usable.
    Opening,
    /// Socket usable, authentication handshake in progress.
    Open,
    /// Handshake completed; requests may be sent.
    Authenticated,
    /// Terminal.
    Closed,
}

/// What the connector currently holds: which attempt, in which state.
///
/// Attempt `0` means no attempt has been opened yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub attempt: u64,
    pub state: AttemptState,
}

impl ConnectionStatus {
    pub(crate) const IDLE: Self = Self {
        attempt: 0,
        state: AttemptState::Closed,
    };

    pub fn is_authenticated(&self) -> bool {
        self.state == AttemptState::Authenticated
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt {} {}", self.attempt, self.state)
    }
}

/// Handshake progress while OPEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthStep {
    AwaitingPrompt,
    AwaitingAck,
}

// ── ConnectionAttempt ───────────────────────────────────────────────

pub(crate) struct ConnectionAttempt {
    number: u64,
    state: AttemptState,
    auth: AuthStep,
    access_token: SecretString,
    transport: Box<dyn TransportHandle>,
    /// Dropped on CLOSED so pending requests fail.
    inbound: Option<broadcast::Sender<Arc<InboundMessage>>>,
    ids: IdSequence,
}

impl ConnectionAttempt {
    pub(crate) fn new(
        number: u64,
        transport: Box<dyn TransportHandle>,
        access_token: SecretString,
        inbound_capacity: usize,
    ) -> Self {
        let (inbound, _) = broadcast::channel(inbound_capacity.max(1));
        Self {
            number,
            state: AttemptState::Opening,
            auth: AuthStep::AwaitingPrompt,
            access_token,
            transport,
            inbound: Some(inbound),
            ids: IdSequence::new(),
        }
    }

    pub(crate) fn number(&self) -> u64 {
        self.number
    }

    pub(crate) fn state(&self) -> AttemptState {
        self.state
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            attempt: self.number,
            state: self.state,
        }
    }

    /// Apply one transport event. Returns the new state if it changed.
    pub(crate) fn handle_event(&mut self, event: TransportEvent) -> Option<AttemptState> {
        if self.state == AttemptState::Closed {
            trace!(attempt = self.number, ?event, "event after close ignored");
            return None;
        }

        match event {
            TransportEvent::Opened => {
                if self.state != AttemptState::Opening {
                    return None;
                }
                info!(attempt = self.number, "socket opened, awaiting auth prompt");
                self.state = AttemptState::Open;
                Some(self.state)
            }
            TransportEvent::Text(text) => self.handle_text(&text),
            TransportEvent::Closing { code, reason } => {
                info!(attempt = self.number, code, %reason, "socket closing");
                Some(self.mark_closed())
            }
            TransportEvent::Closed { code, reason } => {
                info!(attempt = self.number, code, %reason, "socket closed");
                Some(self.mark_closed())
            }
            TransportEvent::Failed { error } => {
                warn!(attempt = self.number, %error, "socket failed");
                Some(self.mark_closed())
            }
        }
    }

    fn handle_text(&mut self, text: &str) -> Option<AttemptState> {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(attempt = self.number, error = %e, "dropping malformed frame");
                return None;
            }
        };

        match self.state {
            AttemptState::Open => self.handle_handshake(&message),
            AttemptState::Authenticated => {
                trace!(attempt = self.number, id = ?message.id, kind = ?message.kind, "inbound message");
                if let Some(inbound) = &self.inbound {
                    // No listeners is fine; nobody asked for this message.
                    let _ = inbound.send(Arc::new(message));
                }
                None
            }
            AttemptState::Opening | AttemptState::Closed => None,
        }
    }

    fn handle_handshake(&mut self, message: &InboundMessage) -> Option<AttemptState> {
        match (self.auth, message.auth_phase()) {
            (AuthStep::AwaitingPrompt, Some(AuthPhase::Required)) => {
                match encode_auth(&self.access_token).and_then(|text| self.transport.send(text)) {
                    Ok(()) => {
                        debug!(attempt = self.number, "auth sent");
                        self.auth = AuthStep::AwaitingAck;
                        None
                    }
                    Err(e) => {
                        warn!(attempt = self.number, error = %e, "failed to send auth");
                        Some(self.fail())
                    }
                }
            }
            (AuthStep::AwaitingAck, Some(AuthPhase::Accepted)) => {
                info!(attempt = self.number, "authenticated");
                self.state = AttemptState::Authenticated;
                Some(self.state)
            }
            (AuthStep::AwaitingAck, Some(AuthPhase::Rejected)) => {
                warn!(
                    attempt = self.number,
                    reason = message.message().unwrap_or("none given"),
                    "authentication rejected"
                );
                Some(self.fail())
            }
            (step, _) => {
                warn!(
                    attempt = self.number,
                    ?step,
                    kind = ?message.kind,
                    "unexpected message during auth"
                );
                Some(self.fail())
            }
        }
    }

    /// Assign an id, subscribe for the reply, then send.
    pub(crate) fn dispatch(&mut self, request: &Request) -> Result<PendingRequest, CoreError> {
        let inbound = match (&self.inbound, self.state) {
            (Some(inbound), AttemptState::Authenticated) => inbound.subscribe(),
            _ => return Err(CoreError::ConnectionClosed),
        };

        let id = self.ids.next_id();
        let text = encode_request(id, request)?;
        debug!(attempt = self.number, id, kind = request.kind(), "sending request");
        self.transport.send(text)?;
        Ok(PendingRequest::new(id, self.number, inbound))
    }

    /// Ask the transport to close. The attempt stays in its state until
    /// the transport reports back.
    pub(crate) fn close_transport(&self, code: u16, reason: &str) -> Result<(), CoreError> {
        self.transport.close(code, reason)?;
        Ok(())
    }

    /// Give up on this attempt: close the socket and go to CLOSED.
    fn fail(&mut self) -> AttemptState {
        if let Err(e) = self.transport.close(hasslink_api::CLOSE_NORMAL, "protocol error") {
            debug!(attempt = self.number, error = %e, "close after failure not delivered");
        }
        self.mark_closed()
    }

    /// Enter CLOSED and release the inbound channel.
    pub(crate) fn mark_closed(&mut self) -> AttemptState {
        self.state = AttemptState::Closed;
        self.inbound = None;
        self.state
    }
}

impl fmt::Debug for ConnectionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionAttempt")
            .field("number", &self.number)
            .field("state", &self.state)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
