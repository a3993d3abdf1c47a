//! `tokio-tungstenite` implementation of the transport contract.
//!
//! Every [`Transport::open`] spawns one connection task that owns the
//! socket: it reports lifecycle and text frames through the event channel
//! and writes whatever the [`TransportHandle`] queues. The task never
//! reconnects on its own; recovery belongs to whoever consumes the events.
//!
//! # Example
//!
//! ```rust,ignore
//! use hasslink_api::websocket::WebSocketTransport;
//! use hasslink_api::transport::{Transport, TransportEvent};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let url = hasslink_api::protocol::endpoint_url("10.0.0.2", 8123, false)?;
//! let handle = WebSocketTransport::new().open(&url, tx);
//!
//! while let Some(event) = rx.recv().await {
//!     if let TransportEvent::Text(text) = event {
//!         println!("{text}");
//!     }
//! }
//! ```

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use url::Url;

use crate::error::Error;
use crate::transport::{CLOSE_NORMAL, Transport, TransportEvent, TransportEvents, TransportHandle};

/// Close code reported when the stream ends without a close frame.
const CLOSE_ABNORMAL: u16 = 1006;

// ── WebSocketTransport ───────────────────────────────────────────────

/// Opens real WebSocket connections. Must be used from inside a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, endpoint: &Url, events: TransportEvents) -> Box<dyn TransportHandle> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let url = endpoint.clone();
        tokio::spawn(async move {
            run_connection(url, outbound_rx, events).await;
        });
        Box::new(WebSocketConnection { outbound_tx })
    }
}

// ── WebSocketConnection ──────────────────────────────────────────────

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

/// Handle to one connection task.
struct WebSocketConnection {
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

impl TransportHandle for WebSocketConnection {
    fn send(&self, text: String) -> Result<(), Error> {
        self.outbound_tx
            .send(Outbound::Text(text))
            .map_err(|_| Error::TransportGone)
    }

    fn close(&self, code: u16, reason: &str) -> Result<(), Error> {
        self.outbound_tx
            .send(Outbound::Close {
                code,
                reason: reason.to_owned(),
            })
            .map_err(|_| Error::TransportGone)
    }
}

// ── Connection task ──────────────────────────────────────────────────

/// Connect, then pump frames both ways until the socket is done.
async fn run_connection(
    url: Url,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: TransportEvents,
) {
    tracing::info!(url = %url, "Connecting to WebSocket");

    let ws_stream = match connect(&url).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket connect failed");
            let _ = events.send(TransportEvent::Failed {
                error: e.to_string(),
            });
            return;
        }
    };

    tracing::info!("WebSocket connected");
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();
    let mut handle_alive = true;
    let mut close_code = CLOSE_ABNORMAL;
    let mut close_reason = String::new();

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(len = text.len(), "WebSocket text frame");
                        let _ = events.send(TransportEvent::Text(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            close_code = u16::from(cf.code);
                            close_reason = cf.reason.as_str().to_owned();
                        } else {
                            close_code = CLOSE_NORMAL;
                        }
                        tracing::info!(code = close_code, reason = %close_reason, "WebSocket close frame received");
                        let _ = events.send(TransportEvent::Closing {
                            code: close_code,
                            reason: close_reason.clone(),
                        });
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("WebSocket ping");
                    }
                    Some(Err(
                        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                    ))
                    | None => {
                        tracing::info!(code = close_code, "WebSocket stream ended");
                        let _ = events.send(TransportEvent::Closed {
                            code: close_code,
                            reason: close_reason,
                        });
                        return;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket read failed");
                        let _ = events.send(TransportEvent::Failed {
                            error: e.to_string(),
                        });
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
            queued = outbound.recv(), if handle_alive => {
                let result = match queued {
                    Some(Outbound::Text(text)) => write.send(Message::text(text)).await,
                    Some(Outbound::Close { code, reason }) => {
                        tracing::debug!(code, "Sending WebSocket close frame");
                        write
                            .send(Message::Close(Some(CloseFrame {
                                code: code.into(),
                                reason: reason.into(),
                            })))
                            .await
                    }
                    None => {
                        // Every handle was dropped; nobody can use this socket anymore.
                        handle_alive = false;
                        write.close().await
                    }
                };

                if let Err(e) = result {
                    if matches!(
                        e,
                        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
                    ) {
                        tracing::debug!("Write after close ignored");
                    } else {
                        tracing::warn!(error = %e, "WebSocket write failed");
                        let _ = events.send(TransportEvent::Failed {
                            error: e.to_string(),
                        });
                        return;
                    }
                }
            }
        }
    }
}

async fn connect(
    url: &Url,
) -> Result<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    Error,
> {
    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let (ws_stream, _response) = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    Ok(ws_stream)
}
