// hasslink-core: reconnecting, authenticated connector between hasslink-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod connection;
pub mod connector;
pub mod convert;
pub mod correlation;
pub mod error;
pub mod model;
pub mod stream;
mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ConnectorConfig;
pub use connection::{AttemptState, ConnectionStatus};
pub use connector::Connector;
pub use correlation::PendingRequest;
pub use error::CoreError;
pub use stream::{ConnectorStream, EntityEventStream, EntityStateStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    EntityEvent, EntityState, MediaContentType, RgbColor, ServiceAction, ServiceDomain,
    ServiceMessage, WireCommand,
};
