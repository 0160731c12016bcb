use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server -> client frames. Internally tagged so the wire shape is
/// `{"type":"notification","data":{...}}` / `{"type":"pong"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// A freshly persisted notification, forwarded verbatim as JSON.
    Notification { data: Value },
    Pong,
}

impl OutboundEvent {
    /// Serialize into a WebSocket text frame. `None` only on a serialization
    /// failure, which callers log and treat as a skipped delivery.
    pub fn into_message(self) -> Option<Message> {
        match serde_json::to_string(&self) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(_) => None,
        }
    }
}

/// Client -> server frames. Anything with an unrecognized `type` tag lands
/// on `Other` and is ignored, keeping the protocol forward-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Ping,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_event_wire_shape() {
        let event = OutboundEvent::Notification {
            data: json!({"id": "abc", "verb": "accepted your connection request"}),
        };

        let wire: Value = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();

        assert_eq!(wire["type"], "notification");
        assert_eq!(wire["data"]["verb"], "accepted your connection request");
    }

    #[test]
    fn pong_event_wire_shape() {
        let wire = serde_json::to_string(&OutboundEvent::Pong).unwrap();
        assert_eq!(wire, r#"{"type":"pong"}"#);
    }

    #[test]
    fn ping_parses_and_unknown_types_land_on_other() {
        assert_eq!(
            serde_json::from_str::<InboundMessage>(r#"{"type":"ping"}"#).unwrap(),
            InboundMessage::Ping
        );
        assert_eq!(
            serde_json::from_str::<InboundMessage>(r#"{"type":"subscribe","topic":"x"}"#).unwrap(),
            InboundMessage::Other
        );
    }

    #[test]
    fn non_object_inbound_fails_to_parse() {
        assert!(serde_json::from_str::<InboundMessage>("\"ping\"").is_err());
        assert!(serde_json::from_str::<InboundMessage>("not json").is_err());
    }
}
