// ── Outbound service-call domain types ──
//
// A `ServiceMessage` is what callers ask for; a `WireCommand` is one
// `call_service` frame. The mapping between the two lives in
// `command::decompose`.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// Integration a service belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceDomain {
    Light,
    Switch,
    InputBoolean,
    MediaPlayer,
    Timer,
}

/// Service invoked within a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceAction {
    TurnOn,
    TurnOff,
    Toggle,
    MediaPlay,
    MediaPause,
    MediaStop,
    PlayMedia,
    VolumeUp,
    VolumeDown,
    MediaNextTrack,
    MediaPreviousTrack,
    Start,
    Cancel,
}

/// Kind of content handed to a media player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaContentType {
    #[default]
    Music,
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// `[r, g, b]` as the hub expects it in `rgb_color`.
    pub fn to_json(self) -> Value {
        Value::from(vec![self.red, self.green, self.blue])
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

// ── ServiceMessage ──────────────────────────────────────────────────

/// Default brightness of `LightTurnOn` (full).
pub const FULL_BRIGHTNESS: u8 = 255;

/// A service call as seen by callers.
///
/// Every variant targets exactly one entity. Light "turn on" is the only
/// variant that expands into more than one wire command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceMessage {
    LightTurnOn {
        entity_id: String,
        brightness: u8,
        rgb_color: Option<RgbColor>,
        /// Color temperature.
        kelvin: Option<u32>,
    },
    LightTurnOff { entity_id: String },

    SwitchTurnOn { entity_id: String },
    SwitchTurnOff { entity_id: String },
    SwitchToggle { entity_id: String },

    BooleanTurnOn { entity_id: String },
    BooleanTurnOff { entity_id: String },
    BooleanToggle { entity_id: String },

    MediaPlayerTurnOff { entity_id: String },
    MediaPlayerPlay { entity_id: String },
    MediaPlayerPause { entity_id: String },
    MediaPlayerStop { entity_id: String },
    MediaPlayerPlayMedia {
        entity_id: String,
        content_url: String,
        content_type: MediaContentType,
    },
    MediaPlayerVolumeUp { entity_id: String },
    MediaPlayerVolumeDown { entity_id: String },
    MediaPlayerNextTrack { entity_id: String },
    MediaPlayerPreviousTrack { entity_id: String },

    TimerStart { entity_id: String },
    TimerCancel { entity_id: String },
}

impl ServiceMessage {
    /// Light on at full brightness, no color, no color temperature.
    pub fn light_on(entity_id: impl Into<String>) -> Self {
        Self::LightTurnOn {
            entity_id: entity_id.into(),
            brightness: FULL_BRIGHTNESS,
            rgb_color: None,
            kelvin: None,
        }
    }

    pub fn domain(&self) -> ServiceDomain {
        match self {
            Self::LightTurnOn { .. } | Self::LightTurnOff { .. } => ServiceDomain::Light,
            Self::SwitchTurnOn { .. } | Self::SwitchTurnOff { .. } | Self::SwitchToggle { .. } => {
                ServiceDomain::Switch
            }
            Self::BooleanTurnOn { .. } | Self::BooleanTurnOff { .. } | Self::BooleanToggle { .. } => {
                ServiceDomain::InputBoolean
            }
            Self::MediaPlayerTurnOff { .. }
            | Self::MediaPlayerPlay { .. }
            | Self::MediaPlayerPause { .. }
            | Self::MediaPlayerStop { .. }
            | Self::MediaPlayerPlayMedia { .. }
            | Self::MediaPlayerVolumeUp { .. }
            | Self::MediaPlayerVolumeDown { .. }
            | Self::MediaPlayerNextTrack { .. }
            | Self::MediaPlayerPreviousTrack { .. } => ServiceDomain::MediaPlayer,
            Self::TimerStart { .. } | Self::TimerCancel { .. } => ServiceDomain::Timer,
        }
    }

    pub fn service(&self) -> ServiceAction {
        match self {
            Self::LightTurnOn { .. }
            | Self::SwitchTurnOn { .. }
            | Self::BooleanTurnOn { .. } => ServiceAction::TurnOn,
            Self::LightTurnOff { .. }
            | Self::SwitchTurnOff { .. }
            | Self::BooleanTurnOff { .. }
            | Self::MediaPlayerTurnOff { .. } => ServiceAction::TurnOff,
            Self::SwitchToggle { .. } | Self::BooleanToggle { .. } => ServiceAction::Toggle,
            Self::MediaPlayerPlay { .. } => ServiceAction::MediaPlay,
            Self::MediaPlayerPause { .. } => ServiceAction::MediaPause,
            Self::MediaPlayerStop { .. } => ServiceAction::MediaStop,
            Self::MediaPlayerPlayMedia { .. } => ServiceAction::PlayMedia,
            Self::MediaPlayerVolumeUp { .. } => ServiceAction::VolumeUp,
            Self::MediaPlayerVolumeDown { .. } => ServiceAction::VolumeDown,
            Self::MediaPlayerNextTrack { .. } => ServiceAction::MediaNextTrack,
            Self::MediaPlayerPreviousTrack { .. } => ServiceAction::MediaPreviousTrack,
            Self::TimerStart { .. } => ServiceAction::Start,
            Self::TimerCancel { .. } => ServiceAction::Cancel,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::LightTurnOn { entity_id, .. }
            | Self::LightTurnOff { entity_id }
            | Self::SwitchTurnOn { entity_id }
            | Self::SwitchTurnOff { entity_id }
            | Self::SwitchToggle { entity_id }
            | Self::BooleanTurnOn { entity_id }
            | Self::BooleanTurnOff { entity_id }
            | Self::BooleanToggle { entity_id }
            | Self::MediaPlayerTurnOff { entity_id }
            | Self::MediaPlayerPlay { entity_id }
            | Self::MediaPlayerPause { entity_id }
            | Self::MediaPlayerStop { entity_id }
            | Self::MediaPlayerPlayMedia { entity_id, .. }
            | Self::MediaPlayerVolumeUp { entity_id }
            | Self::MediaPlayerVolumeDown { entity_id }
            | Self::MediaPlayerNextTrack { entity_id }
            | Self::MediaPlayerPreviousTrack { entity_id }
            | Self::TimerStart { entity_id }
            | Self::TimerCancel { entity_id } => entity_id,
        }
    }
}

impl fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.domain(), self.service(), self.entity_id())?;
        match self {
            Self::LightTurnOn {
                brightness,
                rgb_color,
                kelvin,
                ..
            } => {
                write!(f, " (brightness={brightness}")?;
                if let Some(rgb) = rgb_color {
                    write!(f, ", rgb={rgb}")?;
                }
                if let Some(kelvin) = kelvin {
                    write!(f, ", kelvin={kelvin}")?;
                }
                f.write_str(")")
            }
            Self::MediaPlayerPlayMedia {
                content_url,
                content_type,
                ..
            } => write!(f, " ({content_type} {content_url})"),
            _ => Ok(()),
        }
    }
}

// ── WireCommand ─────────────────────────────────────────────────────

/// One `call_service` frame, before it is stamped with an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireCommand {
    pub domain: ServiceDomain,
    pub service: ServiceAction,
    pub service_data: Map<String, Value>,
}
