// ── Reconnection supervisor ──
//
// A single worker task owns the current `ConnectionAttempt`. It is the
// only place attempt state changes, so transport events, request
// dispatch and the reconnect timer are serialized through one `select!`.
//
// Every time the current attempt reaches CLOSED the worker waits the
// cooldown and opens exactly one new attempt. Shutdown stops that loop
// first, then closes the socket and waits (bounded) for it to report
// closed.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hasslink_api::{CLOSE_NORMAL, Request, Transport, TransportEvent};

use crate::config::ConnectorConfig;
use crate::connection::{AttemptState, ConnectionAttempt, ConnectionStatus};
use crate::correlation::PendingRequest;
use crate::error::CoreError;

/// Reason sent with the close frame on shutdown.
pub(crate) const SHUTDOWN_REASON: &str = "shutdown";

/// Messages from connector handles to the worker.
pub(crate) enum WorkerCommand {
    /// Send `request` on `attempt`, if that attempt is still current and
    /// authenticated.
    Dispatch {
        attempt: u64,
        request: Request,
        reply: oneshot::Sender<Result<PendingRequest, CoreError>>,
    },
    Shutdown,
}

// ── Worker ──────────────────────────────────────────────────────────

pub(crate) struct Supervisor {
    config: ConnectorConfig,
    transport: Arc<dyn Transport>,
    status: watch::Sender<ConnectionStatus>,
    opened: u64,
}

impl Supervisor {
    pub(crate) fn new(
        config: ConnectorConfig,
        transport: Arc<dyn Transport>,
        status: watch::Sender<ConnectionStatus>,
    ) -> Self {
        Self {
            config,
            transport,
            status,
            opened: 0,
        }
    }

    fn open_attempt(&mut self) -> (ConnectionAttempt, mpsc::UnboundedReceiver<TransportEvent>) {
        self.opened += 1;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        info!(attempt = self.opened, endpoint = %self.config.endpoint, "opening connection attempt");
        let handle = self.transport.open(&self.config.endpoint, events_tx);
        let attempt = ConnectionAttempt::new(
            self.opened,
            handle,
            self.config.access_token.clone(),
            self.config.inbound_capacity,
        );
        self.publish(&attempt);
        (attempt, events_rx)
    }

    fn publish(&self, attempt: &ConnectionAttempt) {
        self.status.send_replace(attempt.status());
    }

    /// Run until shutdown is requested (or every handle is gone).
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<WorkerCommand>) {
        let (mut current, mut events) = self.open_attempt();
        let mut events_open = true;
        let mut commands_open = true;
        let mut reopen_at: Option<Instant> = None;
        let mut shutdown_deadline: Option<Instant> = None;

        loop {
            let reopen = sleep_until(reopen_at.unwrap_or_else(Instant::now));
            let deadline = sleep_until(shutdown_deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                biased;

                event = events.recv(), if events_open => {
                    let event = event.unwrap_or_else(|| {
                        events_open = false;
                        TransportEvent::Failed { error: "transport dropped its event channel".into() }
                    });
                    let Some(state) = current.handle_event(event) else { continue };
                    self.publish(&current);

                    if state == AttemptState::Closed {
                        if shutdown_deadline.is_some() {
                            info!(attempt = current.number(), "closed for shutdown");
                            break;
                        }
                        let cooldown = self.config.reconnect_cooldown;
                        info!(
                            attempt = current.number(),
                            delay_ms = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
                            "connection closed, reopening after cooldown"
                        );
                        reopen_at = Some(Instant::now() + cooldown);
                    }
                }

                () = reopen, if reopen_at.is_some() => {
                    reopen_at = None;
                    (current, events) = self.open_attempt();
                    events_open = true;
                }

                () = deadline, if shutdown_deadline.is_some() => {
                    warn!(
                        attempt = current.number(),
                        "socket did not report closed before shutdown timeout"
                    );
                    break;
                }

                command = commands.recv(), if commands_open => match command.unwrap_or_else(|| {
                    commands_open = false;
                    WorkerCommand::Shutdown
                }) {
                    WorkerCommand::Dispatch { attempt, request, reply } => {
                        let result = if shutdown_deadline.is_some() {
                            Err(CoreError::ConnectorStopped)
                        } else if attempt == current.number() {
                            current.dispatch(&request)
                        } else {
                            debug!(attempt, current = current.number(), "request for stale attempt");
                            Err(CoreError::ConnectionClosed)
                        };
                        let _ = reply.send(result);
                    }
                    WorkerCommand::Shutdown => {
                        if shutdown_deadline.is_some() {
                            continue;
                        }
                        reopen_at = None;
                        shutdown_deadline = Some(Instant::now() + self.config.shutdown_timeout);

                        if current.state() == AttemptState::Closed {
                            break;
                        }
                        info!(attempt = current.number(), "shutting down, closing socket");
                        if let Err(e) = current.close_transport(CLOSE_NORMAL, SHUTDOWN_REASON) {
                            warn!(attempt = current.number(), error = %e, "close on shutdown failed");
                            break;
                        }
                    }
                },
            }
        }

        current.mark_closed();
        self.publish(&current);
        debug!(attempts = self.opened, "supervisor stopped");
    }
}

// ── WorkerLink ──────────────────────────────────────────────────────

/// Caller-side access to the worker: wait for an authenticated attempt,
/// then dispatch requests scoped to it.
#[derive(Clone)]
pub(crate) struct WorkerLink {
    commands: mpsc::Sender<WorkerCommand>,
    status: watch::Receiver<ConnectionStatus>,
    cancel: CancellationToken,
}

impl WorkerLink {
    pub(crate) fn new(
        commands: mpsc::Sender<WorkerCommand>,
        status: watch::Receiver<ConnectionStatus>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            commands,
            status,
            cancel,
        }
    }

    /// Wait for an authenticated attempt newer than `after` and return its
    /// number. Pass `0` to accept whichever attempt is authenticated now.
    pub(crate) async fn authenticated_after(&mut self, after: u64) -> Result<u64, CoreError> {
        let cancel = self.cancel.clone();
        let status = &mut self.status;
        let authenticated = async move {
            status
                .wait_for(|s| s.is_authenticated() && s.attempt > after)
                .await
                .map(|s| s.attempt)
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CoreError::ConnectorStopped),
            attempt = authenticated => attempt.map_err(|_| CoreError::ConnectorStopped),
        }
    }

    /// Send `request` on `attempt`.
    pub(crate) async fn dispatch(
        &self,
        attempt: u64,
        request: Request,
    ) -> Result<PendingRequest, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(WorkerCommand::Dispatch {
                attempt,
                request,
                reply,
            })
            .await
            .map_err(|_| CoreError::ConnectorStopped)?;
        rx.await.map_err(|_| CoreError::ConnectorStopped)?
    }

    /// Ask the worker to shut down. No-op if it is already gone.
    pub(crate) async fn shutdown(&self) {
        let _ = self.commands.send(WorkerCommand::Shutdown).await;
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
