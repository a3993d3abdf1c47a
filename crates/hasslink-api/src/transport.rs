// Transport adapter contract.
//
// A transport opens one socket per call to `open` and reports everything
// that happens on it as `TransportEvent`s through the supplied channel.
// The channel is unbounded so lifecycle callbacks never block the socket
// task. Whoever owns the receiving end serializes all state changes.

use tokio::sync::mpsc;
use url::Url;

use crate::error::Error;

/// WebSocket status code for a normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Something that happened on an opened socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The socket is usable.
    Opened,
    /// A text frame arrived.
    Text(String),
    /// The peer started the close handshake.
    Closing { code: u16, reason: String },
    /// The socket is fully closed.
    Closed { code: u16, reason: String },
    /// The socket failed (connect error, I/O error, protocol violation).
    Failed { error: String },
}

impl TransportEvent {
    /// `true` for every event after which the socket carries no more traffic.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Closing { .. } | Self::Closed { .. } | Self::Failed { .. }
        )
    }
}

/// Sending half of a transport's lifecycle channel.
pub type TransportEvents = mpsc::UnboundedSender<TransportEvent>;

/// Opens sockets to an endpoint.
///
/// `open` returns immediately; the connection itself is established in
/// the background and announced with [`TransportEvent::Opened`] (or
/// [`TransportEvent::Failed`]).
pub trait Transport: Send + Sync + 'static {
    fn open(&self, endpoint: &Url, events: TransportEvents) -> Box<dyn TransportHandle>;
}

/// Handle to one opened socket.
///
/// Both methods only queue work for the socket task and never block.
pub trait TransportHandle: Send + Sync {
    /// Queue a text frame.
    fn send(&self, text: String) -> Result<(), Error>;

    /// Start the close handshake.
    fn close(&self, code: u16, reason: &str) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_events() {
        assert!(!TransportEvent::Opened.is_terminal());
        assert!(!TransportEvent::Text("{}".into()).is_terminal());
        assert!(
            TransportEvent::Closing {
                code: CLOSE_NORMAL,
                reason: String::new(),
            }
            .is_terminal()
        );
        assert!(
            TransportEvent::Failed {
                error: "reset".into(),
            }
            .is_terminal()
        );
    }
}
