// ── Core error types ──
//
// User-facing errors from hasslink-core. Callers see service-call
// rejections and connection loss as domain outcomes; wire-layer failures
// are wrapped in `Api` without being reinterpreted.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Service call errors ──────────────────────────────────────────
    /// The hub answered a command of a service call with `success: false`.
    /// Carries the hub's `error` payload unchanged.
    #[error("Service call rejected by hub: {}", describe_payload(.error.as_ref()))]
    CallServiceFailed { error: Option<Value> },

    // ── Connection errors ────────────────────────────────────────────
    /// The attempt a request was sent on closed before its reply arrived.
    #[error("Connection closed before the reply arrived")]
    ConnectionClosed,

    /// The listener waiting for a reply fell behind the inbound queue and
    /// the reply may have been dropped with the skipped messages.
    #[error("Reply to request {id} lost: inbound queue overflowed")]
    ReplyLost { id: u64 },

    /// The connector was stopped while the operation was waiting.
    #[error("Connector stopped")]
    ConnectorStopped,

    // ── Wire-layer errors ────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] hasslink_api::Error),
}

impl CoreError {
    /// `true` when the hub itself rejected a service call, as opposed to
    /// the call never completing.
    pub fn is_call_service_failure(&self) -> bool {
        matches!(self, Self::CallServiceFailed { .. })
    }

    /// The hub's error object for a rejected service call.
    pub fn error_payload(&self) -> Option<&Value> {
        match self {
            Self::CallServiceFailed { error } => error.as_ref(),
            _ => None,
        }
    }
}

fn describe_payload(error: Option<&Value>) -> String {
    let Some(error) = error else {
        return "no error details".into();
    };
    match error.get("message").and_then(Value::as_str) {
        Some(message) => match error.get("code").and_then(Value::as_str) {
            Some(code) => format!("{message} ({code})"),
            None => message.to_owned(),
        },
        None => error.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejection_message_uses_hub_text() {
        let err = CoreError::CallServiceFailed {
            error: Some(json!({"code": "not_found", "message": "Service not found."})),
        };
        assert_eq!(
            err.to_string(),
            "Service call rejected by hub: Service not found. (not_found)"
        );
        assert!(err.is_call_service_failure());
        assert_eq!(err.error_payload().unwrap()["code"], "not_found");
    }

    #[test]
    fn rejection_without_payload() {
        let err = CoreError::CallServiceFailed { error: None };
        assert_eq!(err.to_string(), "Service call rejected by hub: no error details");
        assert!(err.error_payload().is_none());
    }

    #[test]
    fn connection_errors_are_not_rejections() {
        assert!(!CoreError::ConnectionClosed.is_call_service_failure());
        assert!(!CoreError::ConnectorStopped.is_call_service_failure());
        assert!(!CoreError::ReplyLost { id: 4 }.is_call_service_failure());
    }
}
