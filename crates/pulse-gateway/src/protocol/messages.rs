//! Client-to-server events
//!
//! Wire format mirrors the outbound events: `{"event": "<name>", "data":
//! {...}}` with snake_case names. Payload shapes are validated at the
//! boundary before any handler logic runs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use pulse_core::{MessageId, PrincipalId, RoomId, MAX_CONTENT_LENGTH};

/// Payload for room join/leave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPayload {
    pub room_id: RoomId,
}

/// Payload for sending a room message
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomMessagePayload {
    pub room_id: RoomId,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

/// Payload for sending a direct message
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendDirectMessagePayload {
    pub receiver_id: PrincipalId,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

/// Payload for typing start/stop
///
/// Exactly one of `room_id` / `receiver_id` must be set; the handler
/// rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<PrincipalId>,
}

impl TypingPayload {
    /// Whether the payload addresses exactly one target
    #[must_use]
    pub fn has_single_target(&self) -> bool {
        self.room_id.is_some() != self.receiver_id.is_some()
    }
}

/// Payload for marking a direct message read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadPayload {
    pub message_id: MessageId,
    /// The original sender, who receives the read receipt
    pub sender_id: PrincipalId,
}

/// Every event a client can send to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(RoomPayload),
    LeaveRoom(RoomPayload),
    SendRoomMessage(RoomMessagePayload),
    SendDirectMessage(SendDirectMessagePayload),
    TypingStart(TypingPayload),
    TypingStop(TypingPayload),
    MarkRead(MarkReadPayload),
}

impl ClientEvent {
    /// Wire name of the event, for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join_room",
            Self::LeaveRoom(_) => "leave_room",
            Self::SendRoomMessage(_) => "send_room_message",
            Self::SendDirectMessage(_) => "send_direct_message",
            Self::TypingStart(_) => "typing_start",
            Self::TypingStop(_) => "typing_stop",
            Self::MarkRead(_) => "mark_read",
        }
    }

    /// Parse from the wire JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_room() {
        let room_id = RoomId::generate();
        let json = format!(r#"{{"event":"join_room","data":{{"room_id":"{room_id}"}}}}"#);

        let event = ClientEvent::from_json(&json).unwrap();
        assert!(matches!(event, ClientEvent::JoinRoom(p) if p.room_id == room_id));
    }

    #[test]
    fn test_parse_send_direct_message() {
        let receiver_id = PrincipalId::generate();
        let json = format!(
            r#"{{"event":"send_direct_message","data":{{"receiver_id":"{receiver_id}","content":"hi"}}}}"#
        );

        let event = ClientEvent::from_json(&json).unwrap();
        assert_eq!(event.name(), "send_direct_message");
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(ClientEvent::from_json(r#"{"event":"shutdown","data":{}}"#).is_err());
        assert!(ClientEvent::from_json("not json").is_err());
    }

    #[test]
    fn test_content_length_validation() {
        let payload = RoomMessagePayload {
            room_id: RoomId::generate(),
            content: "x".repeat(MAX_CONTENT_LENGTH + 1),
        };
        assert!(payload.validate().is_err());

        let payload = RoomMessagePayload {
            room_id: RoomId::generate(),
            content: "hello".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_typing_payload_single_target() {
        let both = TypingPayload {
            room_id: Some(RoomId::generate()),
            receiver_id: Some(PrincipalId::generate()),
        };
        assert!(!both.has_single_target());

        let neither = TypingPayload {
            room_id: None,
            receiver_id: None,
        };
        assert!(!neither.has_single_target());

        let room_only = TypingPayload {
            room_id: Some(RoomId::generate()),
            receiver_id: None,
        };
        assert!(room_only.has_single_target());
    }
}
