use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ConversationReply;

// Request DTOs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub thread_id: Option<String>,
}

// Response DTOs
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ChatResponse {
    Reply {
        reply: String,
        #[serde(rename = "threadId")]
        thread_id: String,
    },
    NotCompleted {
        error: String,
        #[serde(rename = "threadId")]
        thread_id: String,
    },
}

impl From<ConversationReply> for ChatResponse {
    fn from(reply: ConversationReply) -> Self {
        match reply {
            ConversationReply::Completed { reply, thread_id } => {
                ChatResponse::Reply { reply, thread_id }
            }
            ConversationReply::NotCompleted { status, thread_id } => ChatResponse::NotCompleted {
                error: format!("Run status: {} (not completed)", status),
                thread_id,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
