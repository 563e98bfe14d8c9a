use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    #[serde(other)]
    Other,
}

/// A message on an upstream thread, reduced to what the relay reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadMessage {
    pub role: MessageRole,
    pub text_parts: Vec<String>,
    pub created_at: i64,
}

impl ThreadMessage {
    /// Joined text content, or `None` when the message carries no text.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .text_parts
            .iter()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// Text of the most recent assistant message. Newer `created_at` wins; on a
/// tie the earlier entry wins, since the upstream lists newest first.
pub fn latest_assistant_text(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .fold(None::<&ThreadMessage>, |latest, m| match latest {
            Some(current) if current.created_at >= m.created_at => Some(current),
            _ => Some(m),
        })
        .and_then(ThreadMessage::text)
}
