// hasslink-api: wire protocol and socket transport for the Home Assistant real-time API

pub mod error;
pub mod protocol;
pub mod transport;
pub mod websocket;

pub use error::Error;
pub use protocol::{AuthPhase, InboundMessage, Request};
pub use transport::{CLOSE_NORMAL, Transport, TransportEvent, TransportEvents, TransportHandle};
pub use websocket::WebSocketTransport;
