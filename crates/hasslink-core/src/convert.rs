// ── Wire-to-domain conversions ──
//
// Bridges loosely-typed hub payloads into `hasslink_core::model` types.
// Objects that do not carry the required fields map to `None` and are
// dropped by the caller; nothing here fails loudly.

use serde_json::{Map, Value};

use hasslink_api::{InboundMessage, Request};

use crate::model::{EntityEvent, EntityState, SUN_ENTITY_ID, WireCommand};

// ── Entity states ──────────────────────────────────────────────────

/// Map one state object to an [`EntityState`].
///
/// Accepts both the flat shape of a `get_states` item and the
/// `state_changed` event data shape, where state and attributes sit under
/// `new_state`.
pub fn entity_state_from_json(obj: &Map<String, Value>) -> Option<EntityState> {
    let id = obj.get("entity_id")?.as_str()?;
    let new_state = obj.get("new_state").and_then(Value::as_object);

    let state = obj
        .get("state")
        .and_then(Value::as_str)
        .or_else(|| new_state?.get("state")?.as_str())?;

    if id != SUN_ENTITY_ID {
        return Some(EntityState::simple(id, state));
    }

    let attributes = obj
        .get("attributes")
        .and_then(Value::as_object)
        .or_else(|| new_state?.get("attributes")?.as_object());
    let elevation = attributes?.get("elevation")?.as_f64()?;
    Some(EntityState::sun(id, state, elevation))
}

/// Every mappable state in a `get_states` result, in hub order.
pub fn entity_states_from_result(message: &InboundMessage) -> Vec<EntityState> {
    message
        .result_items()
        .iter()
        .filter_map(Value::as_object)
        .filter_map(entity_state_from_json)
        .collect()
}

// ── Entity events ──────────────────────────────────────────────────

/// Map the data of a device event to an [`EntityEvent`].
///
/// `event` may be any JSON value; strings are taken verbatim, everything
/// else in its JSON text form.
pub fn entity_event_from_json(obj: &Map<String, Value>) -> Option<EntityEvent> {
    let id = obj.get("id")?.as_str()?;
    let event = match obj.get("event")? {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(EntityEvent {
        id: id.to_owned(),
        event,
    })
}

// ── Commands ───────────────────────────────────────────────────────

impl From<WireCommand> for Request {
    fn from(command: WireCommand) -> Self {
        Request::CallService {
            domain: command.domain.to_string(),
            service: command.service.to_string(),
            service_data: command.service_data,
        }
    }
}
