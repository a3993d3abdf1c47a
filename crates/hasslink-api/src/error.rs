use thiserror::Error;

/// Top-level error type for the `hasslink-api` crate.
///
/// Covers every failure mode of the wire layer: endpoint construction,
/// socket transport, and JSON encoding/decoding. `hasslink-core` wraps
/// these in its own error type.
#[derive(Debug, Error)]
pub enum Error {
    // ── Endpoint ────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// The connection task behind a transport handle has already exited,
    /// so the frame could not be queued.
    #[error("WebSocket transport is no longer running")]
    TransportGone,

    // ── Data ────────────────────────────────────────────────────────
    /// Inbound JSON deserialization failed, with the raw frame for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Outbound message could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Returns `true` if this error came from the socket rather than
    /// from message content.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::WebSocketConnect(_) | Self::TransportGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_classified() {
        assert!(Error::TransportGone.is_transport());
        assert!(Error::WebSocketConnect("refused".into()).is_transport());
        assert!(
            !Error::Deserialization {
                message: "eof".into(),
                body: String::new(),
            }
            .is_transport()
        );
    }
}
