use serde_json::Value;

use crate::settings::MatchSettings;

#[derive(Debug)]
pub enum ParsedClientMessage {
    Join {
        participant_id: Option<String>,
        name: Option<String>,
        room_id: Option<String>,
    },
    Configure {
        settings: MatchSettings,
    },
    /// Payload is validated by the sync layer so it can report why it failed.
    Control {
        payload: Value,
    },
    Restart,
    Ping {
        t: f64,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "join" => {
            let participant_id = parse_optional_str(object.get("participantId"))?;
            let name = parse_optional_str(object.get("name"))?;
            let room_id = parse_optional_str(object.get("roomId"))?;
            Some(ParsedClientMessage::Join {
                participant_id,
                name,
                room_id,
            })
        }
        "configure" => {
            let settings = match object.get("settings") {
                None => MatchSettings::default(),
                Some(value) => {
                    value.as_object()?;
                    serde_json::from_value(value.clone()).ok()?
                }
            };
            Some(ParsedClientMessage::Configure { settings })
        }
        "control" => Some(ParsedClientMessage::Control {
            payload: value.clone(),
        }),
        "restart" => Some(ParsedClientMessage::Restart),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

fn parse_optional_str(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(value) => Some(Some(value.as_str()?.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_join_message() {
        let parsed = parse_client_message(
            r#"{"type":"join","participantId":"p-1","name":"A","roomId":"main"}"#,
        )
        .expect("join message should parse");
        match parsed {
            ParsedClientMessage::Join {
                participant_id,
                name,
                room_id,
            } => {
                assert_eq!(participant_id.as_deref(), Some("p-1"));
                assert_eq!(name.as_deref(), Some("A"));
                assert_eq!(room_id.as_deref(), Some("main"));
            }
            _ => panic!("expected join message"),
        }
    }

    #[test]
    fn parse_join_rejects_non_string_id() {
        assert!(parse_client_message(r#"{"type":"join","participantId":7}"#).is_none());
        assert!(matches!(
            parse_client_message(r#"{"type":"join","participantId":null}"#),
            Some(ParsedClientMessage::Join {
                participant_id: None,
                ..
            })
        ));
    }

    #[test]
    fn parse_configure_fills_defaults() {
        let parsed = parse_client_message(
            r#"{"type":"configure","settings":{"bossMaxHealth":20,"shieldEnabled":false}}"#,
        )
        .expect("configure should parse");
        match parsed {
            ParsedClientMessage::Configure { settings } => {
                assert_eq!(settings.boss_max_health, 20);
                assert!(!settings.shield_enabled);
                assert_eq!(settings.hazard_spawn_interval_ms, 5_000);
            }
            _ => panic!("expected configure message"),
        }
        assert!(matches!(
            parse_client_message(r#"{"type":"configure"}"#),
            Some(ParsedClientMessage::Configure { .. })
        ));
    }

    #[test]
    fn parse_configure_accepts_fractional_and_null_numbers() {
        let parsed = parse_client_message(
            r#"{"type":"configure","settings":{"projectileCooldownMs":250.5,"bossMaxHealth":null}}"#,
        );
        match parsed {
            Some(ParsedClientMessage::Configure { settings }) => {
                assert_eq!(settings.projectile_cooldown_ms, 251);
                assert_eq!(settings.boss_max_health, 100);
            }
            _ => panic!("expected configure message"),
        }
    }

    #[test]
    fn parse_configure_rejects_wrong_types() {
        assert!(parse_client_message(r#"{"type":"configure","settings":"hard"}"#).is_none());
        assert!(
            parse_client_message(r#"{"type":"configure","settings":{"bossMaxHealth":"x"}}"#)
                .is_none()
        );
    }

    #[test]
    fn control_payload_is_passed_through() {
        let parsed = parse_client_message(r#"{"type":"control","seq":3,"fire":true}"#);
        match parsed {
            Some(ParsedClientMessage::Control { payload }) => {
                assert_eq!(payload.get("seq").and_then(Value::as_u64), Some(3));
            }
            _ => panic!("expected control message"),
        }
    }

    #[test]
    fn parse_ping_requires_finite_number() {
        let parsed = parse_client_message(r#"{"type":"ping","t":12.5}"#);
        assert!(matches!(parsed, Some(ParsedClientMessage::Ping { .. })));
        assert!(parse_client_message(r#"{"type":"ping","t":"soon"}"#).is_none());
    }

    #[test]
    fn unknown_or_broken_messages_are_rejected() {
        assert!(parse_client_message("not json").is_none());
        assert!(parse_client_message(r#"[1,2]"#).is_none());
        assert!(parse_client_message(r#"{"type":"dance"}"#).is_none());
        assert!(matches!(
            parse_client_message(r#"{"type":"restart"}"#),
            Some(ParsedClientMessage::Restart)
        ));
    }
}
