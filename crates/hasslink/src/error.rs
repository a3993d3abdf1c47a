//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hasslink_config::ConfigError;
use hasslink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Connection to the hub closed before the call completed")]
    #[diagnostic(
        code(hasslink::connection_closed),
        help("The hub dropped the socket mid-call. Retry once it is reachable again.")
    )]
    ConnectionClosed,

    #[error("Connector stopped")]
    #[diagnostic(code(hasslink::stopped))]
    Stopped,

    #[error("Hub connection failed: {0}")]
    #[diagnostic(
        code(hasslink::transport),
        help("Check that the hub is running and reachable at the configured host and port.")
    )]
    Transport(#[source] CoreError),

    // ── Authentication ───────────────────────────────────────────────
    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(hasslink::no_credentials),
        help(
            "Store one with: hasslink config set-token --profile {profile}\n\
             Or set the HASSLINK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Service calls ────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(hasslink::call_rejected),
        help("Commands sent before the rejection were applied and are not rolled back.")
    )]
    CallRejected { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hasslink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hasslink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hasslink config set host <HOST> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No hub configured")]
    #[diagnostic(
        code(hasslink::no_config),
        help(
            "Pass --host, or create a profile with: hasslink config set host <HOST>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hasslink::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Service call did not complete within {seconds}s")]
    #[diagnostic(
        code(hasslink::timeout),
        help("Increase it with --timeout or check that the hub is reachable.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionClosed | Self::Transport(_) => exit_code::CONNECTION,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::CallRejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::Stopped | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            err @ CoreError::CallServiceFailed { .. } => CliError::CallRejected {
                message: err.to_string(),
            },
            CoreError::ConnectionClosed | CoreError::ReplyLost { .. } => CliError::ConnectionClosed,
            CoreError::ConnectorStopped => CliError::Stopped,
            err @ CoreError::Api(_) => CliError::Transport(err),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejection_keeps_hub_message() {
        let err: CliError = CoreError::CallServiceFailed {
            error: Some(json!({"code": "not_found", "message": "Entity not found"})),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::REJECTED);
        assert!(err.to_string().contains("Entity not found"));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::from(CoreError::ConnectionClosed).exit_code(), exit_code::CONNECTION);
        assert_eq!(CliError::Timeout { seconds: 3 }.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::from(ConfigError::NoCredentials { profile: "home".into() }).exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(ConfigError::UnknownProfile { name: "x".into() }).exit_code(),
            exit_code::USAGE
        );
    }
}
