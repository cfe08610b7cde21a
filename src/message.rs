use serde::{Deserialize, Serialize};

/// A chat message relayed to every connected client.
///
/// Wire contract: one JSON object per WebSocket text frame, with exactly two
/// string fields, `username` and `message`. The `text` field serializes under
/// the wire name `message` for compatibility with existing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    #[serde(rename = "message")]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names_are_username_and_message() {
        let msg = ChatMessage {
            username: "alice".to_string(),
            text: "hi".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["message"], "hi");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn decodes_client_payload() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"username":"bob","message":"hello there"}"#).unwrap();
        assert_eq!(msg.username, "bob");
        assert_eq!(msg.text, "hello there");
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(serde_json::from_str::<ChatMessage>("not json").is_err());
        assert!(serde_json::from_str::<ChatMessage>(r#"{"username":"x"}"#).is_err());
    }
}
