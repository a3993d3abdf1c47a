// ── ServiceMessage → WireCommand table ──
//
// Pure mapping. Every message targets one entity; light "turn on" is
// split into one command per attribute since a call only accepts one
// attribute set.

use serde_json::{Map, Value};

use crate::model::{ServiceMessage, WireCommand};

/// Expand a message into the commands to send, in send order.
pub fn decompose(message: &ServiceMessage) -> Vec<WireCommand> {
    let command = |extra: &[(&str, Value)]| {
        let mut service_data = Map::new();
        service_data.insert("entity_id".into(), Value::from(message.entity_id()));
        for (key, value) in extra {
            service_data.insert((*key).into(), value.clone());
        }
        WireCommand {
            domain: message.domain(),
            service: message.service(),
            service_data,
        }
    };

    match message {
        ServiceMessage::LightTurnOn {
            brightness,
            rgb_color,
            kelvin,
            ..
        } => {
            let mut commands = vec![command(&[("brightness", Value::from(*brightness))])];
            if let Some(rgb) = rgb_color {
                commands.push(command(&[("rgb_color", rgb.to_json())]));
            }
            if let Some(kelvin) = kelvin {
                commands.push(command(&[("kelvin", Value::from(*kelvin))]));
            }
            commands
        }
        ServiceMessage::MediaPlayerPlayMedia {
            content_url,
            content_type,
            ..
        } => vec![command(&[
            ("media_content_id", Value::from(content_url.as_str())),
            ("media_content_type", Value::from(content_type.as_ref())),
        ])],
        ServiceMessage::LightTurnOff { .. }
        | ServiceMessage::SwitchTurnOn { .. }
        | ServiceMessage::SwitchTurnOff { .. }
        | ServiceMessage::SwitchToggle { .. }
        | ServiceMessage::BooleanTurnOn { .. }
        | ServiceMessage::BooleanTurnOff { .. }
        | ServiceMessage::BooleanToggle { .. }
        | ServiceMessage::MediaPlayerTurnOff { .. }
        | ServiceMessage::MediaPlayerPlay { .. }
        | ServiceMessage::MediaPlayerPause { .. }
        | ServiceMessage::MediaPlayerStop { .. }
        | ServiceMessage::MediaPlayerVolumeUp { .. }
        | ServiceMessage::MediaPlayerVolumeDown { .. }
        | ServiceMessage::MediaPlayerNextTrack { .. }
        | ServiceMessage::MediaPlayerPreviousTrack { .. }
        | ServiceMessage::TimerStart { .. }
        | ServiceMessage::TimerCancel { .. } => vec![command(&[])],
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{MediaContentType, RgbColor, ServiceAction, ServiceDomain};

    fn data(commands: &[WireCommand]) -> Vec<Value> {
        commands
            .iter()
            .map(|c| Value::Object(c.service_data.clone()))
            .collect()
    }

    #[test]
    fn light_on_splits_per_attribute() {
        let commands = decompose(&ServiceMessage::LightTurnOn {
            entity_id: "light.desk".into(),
            brightness: 200,
            rgb_color: Some(RgbColor::new(255, 0, 0)),
            kelvin: Some(3000),
        });
        assert!(
            commands
                .iter()
                .all(|c| c.domain == ServiceDomain::Light && c.service == ServiceAction::TurnOn)
        );
        assert_eq!(
            data(&commands),
            vec![
                json!({"entity_id": "light.desk", "brightness": 200}),
                json!({"entity_id": "light.desk", "rgb_color": [255, 0, 0]}),
                json!({"entity_id": "light.desk", "kelvin": 3000}),
            ]
        );
    }

    #[test]
    fn light_on_always_sends_brightness() {
        let commands = decompose(&ServiceMessage::light_on("light.hall"));
        assert_eq!(
            data(&commands),
            vec![json!({"entity_id": "light.hall", "brightness": 255})]
        );

        let commands = decompose(&ServiceMessage::LightTurnOn {
            entity_id: "light.hall".into(),
            brightness: 200,
            rgb_color: Some(RgbColor::WHITE),
            kelvin: None,
        });
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn plain_actions_are_single_commands() {
        let messages = [
            ServiceMessage::SwitchToggle {
                entity_id: "switch.fan".into(),
            },
            ServiceMessage::LightTurnOff {
                entity_id: "light.desk".into(),
            },
            ServiceMessage::BooleanTurnOn {
                entity_id: "input_boolean.away".into(),
            },
            ServiceMessage::MediaPlayerNextTrack {
                entity_id: "media_player.kitchen".into(),
            },
            ServiceMessage::TimerCancel {
                entity_id: "timer.tea".into(),
            },
        ];
        for message in &messages {
            let commands = decompose(message);
            assert_eq!(commands.len(), 1, "{message}");
            assert_eq!(
                Value::Object(commands[0].service_data.clone()),
                json!({"entity_id": message.entity_id()})
            );
            assert_eq!(commands[0].domain, message.domain());
            assert_eq!(commands[0].service, message.service());
        }
    }

    #[test]
    fn play_media_carries_content() {
        let commands = decompose(&ServiceMessage::MediaPlayerPlayMedia {
            entity_id: "media_player.kitchen".into(),
            content_url: "http://radio.local/stream.mp3".into(),
            content_type: MediaContentType::Music,
        });
        insta::with_settings!({ sort_maps => true }, {
            insta::assert_json_snapshot!(commands, @r###"
            [
              {
                "domain": "media_player",
                "service": "play_media",
                "service_data": {
                  "entity_id": "media_player.kitchen",
                  "media_content_id": "http://radio.local/stream.mp3",
                  "media_content_type": "music"
                }
              }
            ]
            "###);
        });
    }
}
