// ── Connector ──
//
// Public entry point. Owns the worker that supervises connection
// attempts and hands out streams and service calls that bind to
// whichever attempt is authenticated.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hasslink_api::{Transport, WebSocketTransport};

use crate::command;
use crate::config::ConnectorConfig;
use crate::connection::ConnectionStatus;
use crate::error::CoreError;
use crate::model::ServiceMessage;
use crate::stream::{self, EntityEventStream, EntityStateStream};
use crate::supervisor::{Supervisor, WorkerCommand, WorkerLink};

/// Parts moved into the worker when it starts.
struct Unstarted {
    status: watch::Sender<ConnectionStatus>,
    commands: mpsc::Receiver<WorkerCommand>,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ConnectorInner>`. Does nothing until
/// [`start()`](Self::start); after [`stop()`](Self::stop) it stays stopped.
#[derive(Clone)]
pub struct Connector {
    inner: Arc<ConnectorInner>,
}

struct ConnectorInner {
    config: ConnectorConfig,
    transport: Arc<dyn Transport>,
    link: WorkerLink,
    status: watch::Receiver<ConnectionStatus>,
    cancel: CancellationToken,
    unstarted: Mutex<Option<Unstarted>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Connector {
    /// Connector using the WebSocket transport.
    pub fn new(config: ConnectorConfig) -> Self {
        Self::with_transport(config, Arc::new(WebSocketTransport::new()))
    }

    /// Connector using a custom transport.
    pub fn with_transport(config: ConnectorConfig, transport: Arc<dyn Transport>) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::IDLE);
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity.max(1));
        let cancel = CancellationToken::new();
        let link = WorkerLink::new(command_tx, status_rx.clone(), cancel.clone());

        Self {
            inner: Arc::new(ConnectorInner {
                config,
                transport,
                link,
                status: status_rx,
                cancel,
                unstarted: Mutex::new(Some(Unstarted {
                    status: status_tx,
                    commands: command_rx,
                })),
                worker: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Open the first connection attempt and keep reconnecting until
    /// [`stop()`](Self::stop). Must be called inside a Tokio runtime.
    /// Calling it again has no effect.
    pub fn start(&self) {
        let Some(parts) = lock(&self.inner.unstarted).take() else {
            debug!("connector already started");
            return;
        };

        info!(endpoint = %self.inner.config.endpoint, "starting connector");
        let supervisor = Supervisor::new(
            self.inner.config.clone(),
            Arc::clone(&self.inner.transport),
            parts.status,
        );
        let handle = tokio::spawn(supervisor.run(parts.commands));
        *lock(&self.inner.worker) = Some(handle);
    }

    /// Stop reconnecting, close the socket and wait for it to report
    /// closed (bounded by the shutdown timeout).
    ///
    /// Streams end and waiting calls fail with
    /// [`CoreError::ConnectorStopped`]. Errors while closing are logged
    /// and swallowed; this always completes. Concurrent callers all
    /// return once the worker has finished.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();

        if lock(&self.inner.unstarted).take().is_some() {
            debug!("connector stopped before start");
            return;
        }

        let Some(handle) = lock(&self.inner.worker).take() else {
            // Another caller is stopping; the worker owns the status sender.
            self.inner.link.shutdown().await;
            let mut status = self.inner.status.clone();
            while status.changed().await.is_ok() {}
            return;
        };

        info!("stopping connector");
        self.inner.link.shutdown().await;

        if let Err(e) = handle.await {
            warn!(error = %e, "connector worker ended abnormally");
        }
        info!("connector stopped");
    }

    // ── Streams ──────────────────────────────────────────────────

    /// Entity states: a full snapshot each time an attempt authenticates,
    /// followed by live changes.
    ///
    /// Every call opens its own `get_states` request and `state_changed`
    /// subscription on each attempt. Share one stream between consumers
    /// rather than calling this repeatedly.
    pub fn entity_state_changes(&self) -> EntityStateStream {
        stream::entity_states(self.inner.link.clone())
    }

    /// Device events of the configured entity event type.
    ///
    /// Like [`entity_state_changes`](Self::entity_state_changes), each call
    /// holds its own subscription on the hub for every attempt.
    pub fn entity_events(&self) -> EntityEventStream {
        stream::entity_events(
            self.inner.link.clone(),
            self.inner.config.entity_event_type.clone(),
        )
    }

    // ── Service calls ────────────────────────────────────────────

    /// Execute a service call.
    ///
    /// Waits until an attempt is authenticated, then runs the message's
    /// commands on that attempt in order, stopping at the first rejection
    /// without rolling back earlier commands.
    pub async fn call_service_with(&self, message: &ServiceMessage) -> Result<(), CoreError> {
        let mut link = self.inner.link.clone();
        let attempt = link.authenticated_after(0).await?;
        match command::execute(&link, attempt, message).await {
            Err(CoreError::ConnectionClosed) if link.is_stopped() => Err(CoreError::ConnectorStopped),
            result => result,
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Observe which attempt is current and its state.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
