//! Wire shapes of the upstream API. Only the fields the relay reads are
//! modelled; everything else in the upstream payloads is ignored.

use serde::{Deserialize, Serialize};

use crate::domain::{MessageRole, Run, RunStatus, ThreadMessage};

#[derive(Debug, Serialize)]
pub struct CreateSessionBody<'a> {
    pub workflow_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SessionObject {
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageBody<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateRunBody<'a> {
    pub assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: RunStatus,
}

impl From<RunObject> for Run {
    fn from(obj: RunObject) -> Self {
        Run {
            id: obj.id,
            status: obj.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
pub struct MessageObject {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub value: String,
}

impl From<MessageObject> for ThreadMessage {
    fn from(obj: MessageObject) -> Self {
        let text_parts = obj
            .content
            .into_iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value),
                MessageContent::Unsupported => None,
            })
            .collect();

        ThreadMessage {
            role: obj.role,
            text_parts,
            created_at: obj.created_at,
        }
    }
}
