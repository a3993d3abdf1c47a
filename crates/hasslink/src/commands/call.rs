//! `hasslink call <domain> <action> <entity>`.

use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use hasslink_core::model::FULL_BRIGHTNESS;
use hasslink_core::{
    Connector, MediaContentType, RgbColor, ServiceAction, ServiceDomain, ServiceMessage,
};

use crate::cli::{CallArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(
    connector: &Connector,
    args: &CallArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let message = service_message(args)?;
    info!(%message, "calling service");

    let call = tokio::time::timeout(
        Duration::from_secs(global.timeout),
        connector.call_service_with(&message),
    );
    tokio::select! {
        result = call => match result {
            Ok(result) => result?,
            Err(_) => return Err(CliError::Timeout { seconds: global.timeout }),
        },
        signal = tokio::signal::ctrl_c() => {
            signal?;
            return Err(CliError::Stopped);
        }
    }

    if !global.quiet {
        eprintln!("✓ {message}");
    }
    Ok(())
}

/// Build the `ServiceMessage` described by the command line.
pub fn service_message(args: &CallArgs) -> Result<ServiceMessage, CliError> {
    let domain = ServiceDomain::from_str(&args.domain).map_err(|_| CliError::Validation {
        field: "domain".into(),
        reason: format!(
            "unknown domain '{}' (expected light, switch, input_boolean, media_player or timer)",
            args.domain
        ),
    })?;
    let action = ServiceAction::from_str(&args.action).map_err(|_| unsupported(args))?;
    let entity_id = args.entity.clone();

    let is_light_on = matches!((domain, action), (ServiceDomain::Light, ServiceAction::TurnOn));
    if !is_light_on && (args.brightness.is_some() || args.rgb.is_some() || args.kelvin.is_some()) {
        return Err(CliError::Validation {
            field: "options".into(),
            reason: "--brightness, --rgb and --kelvin only apply to light turn_on".into(),
        });
    }
    let is_play_media = action == ServiceAction::PlayMedia;
    if !is_play_media && args.url.is_some() {
        return Err(CliError::Validation {
            field: "url".into(),
            reason: "--url only applies to media_player play_media".into(),
        });
    }

    let message = match (domain, action) {
        (ServiceDomain::Light, ServiceAction::TurnOn) => ServiceMessage::LightTurnOn {
            entity_id,
            brightness: args.brightness.unwrap_or(FULL_BRIGHTNESS),
            rgb_color: args.rgb.as_deref().map(parse_rgb).transpose()?,
            kelvin: args.kelvin,
        },
        (ServiceDomain::Light, ServiceAction::TurnOff) => ServiceMessage::LightTurnOff { entity_id },

        (ServiceDomain::Switch, ServiceAction::TurnOn) => ServiceMessage::SwitchTurnOn { entity_id },
        (ServiceDomain::Switch, ServiceAction::TurnOff) => ServiceMessage::SwitchTurnOff { entity_id },
        (ServiceDomain::Switch, ServiceAction::Toggle) => ServiceMessage::SwitchToggle { entity_id },

        (ServiceDomain::InputBoolean, ServiceAction::TurnOn) => {
            ServiceMessage::BooleanTurnOn { entity_id }
        }
        (ServiceDomain::InputBoolean, ServiceAction::TurnOff) => {
            ServiceMessage::BooleanTurnOff { entity_id }
        }
        (ServiceDomain::InputBoolean, ServiceAction::Toggle) => {
            ServiceMessage::BooleanToggle { entity_id }
        }

        (ServiceDomain::MediaPlayer, ServiceAction::TurnOff) => {
            ServiceMessage::MediaPlayerTurnOff { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::MediaPlay) => {
            ServiceMessage::MediaPlayerPlay { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::MediaPause) => {
            ServiceMessage::MediaPlayerPause { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::MediaStop) => {
            ServiceMessage::MediaPlayerStop { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::PlayMedia) => {
            let content_url = args.url.clone().ok_or_else(|| CliError::Validation {
                field: "url".into(),
                reason: "play_media needs --url".into(),
            })?;
            ServiceMessage::MediaPlayerPlayMedia {
                entity_id,
                content_url,
                content_type: MediaContentType::Music,
            }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::VolumeUp) => {
            ServiceMessage::MediaPlayerVolumeUp { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::VolumeDown) => {
            ServiceMessage::MediaPlayerVolumeDown { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::MediaNextTrack) => {
            ServiceMessage::MediaPlayerNextTrack { entity_id }
        }
        (ServiceDomain::MediaPlayer, ServiceAction::MediaPreviousTrack) => {
            ServiceMessage::MediaPlayerPreviousTrack { entity_id }
        }

        (ServiceDomain::Timer, ServiceAction::Start) => ServiceMessage::TimerStart { entity_id },
        (ServiceDomain::Timer, ServiceAction::Cancel) => ServiceMessage::TimerCancel { entity_id },

        _ => return Err(unsupported(args)),
    };
    Ok(message)
}

fn unsupported(args: &CallArgs) -> CliError {
    CliError::Validation {
        field: "action".into(),
        reason: format!("{} has no service '{}'", args.domain, args.action),
    }
}

/// Parse `R,G,B` with each channel in 0..=255.
fn parse_rgb(text: &str) -> Result<RgbColor, CliError> {
    let invalid = || CliError::Validation {
        field: "rgb".into(),
        reason: format!("expected R,G,B with values 0-255, got '{text}'"),
    };
    let channels = text
        .split(',')
        .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match channels.as_slice() {
        &[red, green, blue] => Ok(RgbColor::new(red, green, blue)),
        _ => Err(invalid()),
    }
}
