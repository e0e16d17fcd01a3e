use serde::{ Serialize, Deserialize };
use crate::models::chat::ChatMessage;

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "chat")] Chat {
        content: String,
    },
    #[serde(rename = "history")]
    History,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "transcript")] Transcript {
        messages: Vec<ChatMessage>,
    },
    #[serde(rename = "response")] Response {
        message: ChatMessage,
        timestamp: i64,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
    #[serde(rename = "processing")]
    Processing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_frame() {
        let frame = r#"{"type":"chat","content":"What is DAO governance?"}"#;
        match serde_json::from_str::<ClientMessage>(frame).unwrap() {
            ClientMessage::Chat { content } => assert_eq!(content, "What is DAO governance?"),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn processing_frame_is_tag_only() {
        let json = serde_json::to_string(&ServerMessage::Processing).unwrap();
        assert_eq!(json, r#"{"type":"processing"}"#);
    }
}
