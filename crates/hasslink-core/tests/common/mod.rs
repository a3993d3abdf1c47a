// Scripted in-memory transport shared by the connector tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};
use url::Url;

use hasslink_api::{Error, Transport, TransportEvent, TransportEvents, TransportHandle};
use hasslink_core::{Connector, ConnectorConfig, ConnectorStream};

/// Upper bound for any single wait in a test (virtual time).
pub const WAIT: Duration = Duration::from_secs(60);

// ── MockTransport ───────────────────────────────────────────────────

/// Records every socket the connector opens. Tests pick sockets up in
/// order with [`MockTransport::socket`] and script them from there.
pub struct MockTransport {
    sockets: Mutex<Vec<Option<MockSocket>>>,
    opened: watch::Sender<usize>,
    fail_close: bool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sockets: Mutex::new(Vec::new()),
            opened: watch::channel(0).0,
            fail_close: false,
        })
    }

    /// Transport whose `close()` always fails, as if the socket task died.
    pub fn with_failing_close() -> Arc<Self> {
        Arc::new(Self {
            sockets: Mutex::new(Vec::new()),
            opened: watch::channel(0).0,
            fail_close: true,
        })
    }

    /// How many sockets have been opened so far.
    pub fn opened(&self) -> usize {
        *self.opened.borrow()
    }

    /// Wait for the `number`-th socket (1-based) and take it.
    pub async fn socket(&self, number: usize) -> MockSocket {
        let mut opened = self.opened.subscribe();
        tokio::time::timeout(WAIT, opened.wait_for(|n| *n >= number))
            .await
            .expect("socket was never opened")
            .unwrap();
        self.sockets.lock().unwrap()[number - 1]
            .take()
            .expect("socket already taken")
    }
}

impl Transport for MockTransport {
    fn open(&self, _endpoint: &Url, events: TransportEvents) -> Box<dyn TransportHandle> {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let closes = Arc::new(Mutex::new(Vec::new()));
        self.sockets.lock().unwrap().push(Some(MockSocket {
            events,
            sent: sent_rx,
            closes: Arc::clone(&closes),
        }));
        self.opened.send_modify(|n| *n += 1);
        Box::new(MockHandle {
            sent: sent_tx,
            closes,
            fail_close: self.fail_close,
        })
    }
}

struct MockHandle {
    sent: mpsc::UnboundedSender<String>,
    closes: Arc<Mutex<Vec<(u16, String)>>>,
    fail_close: bool,
}

impl TransportHandle for MockHandle {
    fn send(&self, text: String) -> Result<(), Error> {
        self.sent.send(text).map_err(|_| Error::TransportGone)
    }

    fn close(&self, code: u16, reason: &str) -> Result<(), Error> {
        self.closes.lock().unwrap().push((code, reason.to_owned()));
        if self.fail_close {
            Err(Error::TransportGone)
        } else {
            Ok(())
        }
    }
}

// ── MockSocket ──────────────────────────────────────────────────────

/// The hub's side of one opened socket.
pub struct MockSocket {
    events: TransportEvents,
    sent: mpsc::UnboundedReceiver<String>,
    closes: Arc<Mutex<Vec<(u16, String)>>>,
}

impl MockSocket {
    pub fn emit(&self, event: TransportEvent) {
        // The connector drops the receiver once it moved on to a newer
        // attempt; events for a stale socket simply vanish.
        let _ = self.events.send(event);
    }

    pub fn send_json(&self, value: &Value) {
        self.emit(TransportEvent::Text(value.to_string()));
    }

    pub fn send_raw(&self, text: &str) {
        self.emit(TransportEvent::Text(text.to_owned()));
    }

    /// Next frame the connector wrote, parsed.
    pub async fn next_sent(&mut self) -> Value {
        let text = tokio::time::timeout(WAIT, self.sent.recv())
            .await
            .expect("connector sent nothing")
            .expect("transport handle dropped");
        serde_json::from_str(&text).unwrap()
    }

    /// A frame the connector already wrote, if any.
    pub fn try_next_sent(&mut self) -> Option<Value> {
        self.sent
            .try_recv()
            .ok()
            .map(|text| serde_json::from_str(&text).unwrap())
    }

    /// Run the handshake: open, prompt, check the credential, accept.
    pub async fn authenticate(&mut self) {
        self.emit(TransportEvent::Opened);
        self.send_json(&json!({"type": "auth_required", "ha_version": "2024.6.0"}));
        let auth = self.next_sent().await;
        assert_eq!(auth, json!({"type": "auth", "access_token": TOKEN}));
        self.send_json(&json!({"type": "auth_ok", "ha_version": "2024.6.0"}));
    }

    pub fn reply(&self, id: u64, success: bool) {
        self.send_json(&json!({"id": id, "type": "result", "success": success, "result": null}));
    }

    pub fn reject(&self, id: u64, error: Value) {
        self.send_json(&json!({"id": id, "type": "result", "success": false, "error": error}));
    }

    pub fn result(&self, id: u64, result: Value) {
        self.send_json(&json!({"id": id, "type": "result", "success": true, "result": result}));
    }

    pub fn event(&self, id: u64, event_type: &str, data: Value) {
        self.send_json(&json!({
            "id": id,
            "type": "event",
            "event": {"event_type": event_type, "data": data, "origin": "LOCAL"}
        }));
    }

    pub fn drop_connection(&self) {
        self.emit(TransportEvent::Closed {
            code: 1006,
            reason: String::new(),
        });
    }

    pub fn closes(&self) -> Vec<(u16, String)> {
        self.closes.lock().unwrap().clone()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub const TOKEN: &str = "test-token";

pub fn connector(transport: &Arc<MockTransport>) -> Connector {
    let config = ConnectorConfig::for_host("hub.test", 8123, TOKEN.to_string().into()).unwrap();
    Connector::with_transport(config, Arc::clone(transport) as Arc<dyn Transport>)
}

/// Drive a stream on its own task and hand its items over a channel.
pub fn collect<T: Send + 'static>(mut stream: ConnectorStream<T>) -> mpsc::UnboundedReceiver<T> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(item) = stream.recv().await {
            if tx.send(item).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn next_item<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("stream produced nothing")
        .expect("stream ended")
}

/// Let every task run until it blocks.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
