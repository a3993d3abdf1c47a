// ── Domain model ──
//
// Canonical types the connector exposes: what the hub reports (entity
// states and events) and what callers ask it to do (service messages).

pub mod entity;
pub mod service;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity::{EntityEvent, EntityState, SUN_ENTITY_ID};
pub use service::{
    FULL_BRIGHTNESS, MediaContentType, RgbColor, ServiceAction, ServiceDomain, ServiceMessage,
    WireCommand,
};
