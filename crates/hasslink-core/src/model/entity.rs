// ── Entity state and event domain types ──

use serde::Serialize;

/// Entity id of the sun tracker, the only entity with a dedicated variant.
pub const SUN_ENTITY_ID: &str = "sun.sun";

/// Snapshot of one entity's state at a point in time.
///
/// Values are immutable; every change on the hub produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityState {
    Simple {
        id: String,
        state: String,
    },
    Sun {
        id: String,
        state: String,
        /// Solar elevation in degrees.
        elevation: f64,
        above_horizon: bool,
    },
}

impl EntityState {
    pub fn simple(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self::Simple {
            id: id.into(),
            state: state.into(),
        }
    }

    /// Build a sun state; `above_horizon` is derived from the state text.
    pub fn sun(id: impl Into<String>, state: impl Into<String>, elevation: f64) -> Self {
        let state = state.into();
        let above_horizon = is_above_horizon(&state);
        Self::Sun {
            id: id.into(),
            state,
            elevation,
            above_horizon,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Simple { id, .. } | Self::Sun { id, .. } => id,
        }
    }

    pub fn state(&self) -> &str {
        match self {
            Self::Simple { state, .. } | Self::Sun { state, .. } => state,
        }
    }
}

// The hub reports "above_horizon"; older releases used a space.
fn is_above_horizon(state: &str) -> bool {
    let state = state.to_ascii_lowercase();
    state == "above_horizon" || state == "above horizon"
}

/// A device-originated event (e.g. a button press) tied to an entity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityEvent {
    pub id: String,
    /// Event code rendered as text (`"1002"`, `"single"`, ...).
    pub event: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_derives_horizon_flag() {
        let up = EntityState::sun(SUN_ENTITY_ID, "above_horizon", 12.5);
        assert!(matches!(up, EntityState::Sun { above_horizon: true, .. }));

        let legacy = EntityState::sun(SUN_ENTITY_ID, "Above Horizon", 3.0);
        assert!(matches!(legacy, EntityState::Sun { above_horizon: true, .. }));

        let down = EntityState::sun(SUN_ENTITY_ID, "below_horizon", -4.0);
        assert!(matches!(down, EntityState::Sun { above_horizon: false, .. }));
    }

    #[test]
    fn accessors_cover_both_variants() {
        let light = EntityState::simple("light.desk", "on");
        assert_eq!(light.id(), "light.desk");
        assert_eq!(light.state(), "on");

        let sun = EntityState::sun(SUN_ENTITY_ID, "below_horizon", -4.0);
        assert_eq!(sun.id(), "sun.sun");
        assert_eq!(sun.state(), "below_horizon");
    }
}
