use serde::{Deserialize, Serialize};

use crate::domain::SessionId;

/// Path of the exchange endpoint relative to the service base URL.
pub const CHAT_PATH: &str = "/chat/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

/// Body of a successful `POST /chat/`. Every field is required; a reply missing
/// any of them is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub escalated: bool,
    pub session_end: bool,
}

/// Structured outcome of one exchange as seen by the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub escalated: bool,
    pub session_end: bool,
}

impl From<ChatResponse> for ChatReply {
    fn from(value: ChatResponse) -> Self {
        Self {
            reply: value.response,
            escalated: value.escalated,
            session_end: value.session_end,
        }
    }
}
