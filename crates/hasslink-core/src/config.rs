// ── Runtime connector configuration ──
//
// These types describe *how* to reach a hub and how the connector
// behaves around failures. They carry the credential but never touch
// disk. The CLI builds a `ConnectorConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Wait between an attempt reaching CLOSED and the next attempt opening.
pub const DEFAULT_RECONNECT_COOLDOWN: Duration = Duration::from_secs(2);

/// Upper bound on how long `stop()` waits for the socket to close.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Event type carrying device-originated events (button presses and the like).
pub const DEFAULT_ENTITY_EVENT_TYPE: &str = "deconz_event";

/// Inbound messages buffered per attempt before slow waiters start lagging.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1024;

/// Requests that may queue for the worker before callers wait.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Configuration for one connector.
///
/// Built by the CLI, passed to `Connector` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Socket endpoint, e.g. `ws://10.0.0.2:8123/api/websocket`.
    pub endpoint: Url,
    /// Long-lived access token sent in the `auth` message.
    pub access_token: SecretString,
    /// Delay before opening a new attempt after the previous one closed.
    pub reconnect_cooldown: Duration,
    /// How long `stop()` waits for the socket to report closed.
    pub shutdown_timeout: Duration,
    /// Event type subscribed to by `entity_events()`.
    pub entity_event_type: String,
    /// Per-attempt inbound broadcast capacity.
    pub inbound_capacity: usize,
    /// Worker command queue capacity.
    pub command_capacity: usize,
}

impl ConnectorConfig {
    /// Configuration for `endpoint` with every tunable at its default.
    pub fn new(endpoint: Url, access_token: SecretString) -> Self {
        Self {
            endpoint,
            access_token,
            reconnect_cooldown: DEFAULT_RECONNECT_COOLDOWN,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            entity_event_type: DEFAULT_ENTITY_EVENT_TYPE.into(),
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }

    /// Configuration for a hub reachable over plain `ws://host:port`.
    pub fn for_host(host: &str, port: u16, access_token: SecretString) -> Result<Self, CoreError> {
        Self::for_hub(host, port, false, access_token)
    }

    /// Configuration for a hub at `host:port`, over `wss://` when `tls` is set.
    pub fn for_hub(
        host: &str,
        port: u16,
        tls: bool,
        access_token: SecretString,
    ) -> Result<Self, CoreError> {
        let endpoint = hasslink_api::protocol::endpoint_url(host, port, tls)?;
        Ok(Self::new(endpoint, access_token))
    }

    pub fn with_reconnect_cooldown(mut self, cooldown: Duration) -> Self {
        self.reconnect_cooldown = cooldown;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_entity_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.entity_event_type = event_type.into();
        self
    }
}
