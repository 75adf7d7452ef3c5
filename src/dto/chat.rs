use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chatbot::{ChatReply, ChatSession};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatOpenRequest {
    /// Current page path, used for a context hint.
    pub page: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub session: ChatSession,
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub session: ChatSession,
    pub replies: Vec<ChatReply>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatRecoveryRequest {
    /// Session to switch into the recovery flow; a fresh one is started when absent.
    pub session: Option<ChatSession>,
}
