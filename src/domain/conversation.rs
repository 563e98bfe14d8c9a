use super::run::RunStatus;

pub const NO_REPLY_PLACEHOLDER: &str = "(no response)";

/// Outcome of one relayed chat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationReply {
    Completed {
        reply: String,
        thread_id: String,
    },
    /// The run ended in a non-completed state or was still pending when the
    /// poll budget ran out. The client may ask again on the same thread.
    NotCompleted {
        status: RunStatus,
        thread_id: String,
    },
}

impl ConversationReply {
    pub fn thread_id(&self) -> &str {
        match self {
            ConversationReply::Completed { thread_id, .. } => thread_id,
            ConversationReply::NotCompleted { thread_id, .. } => thread_id,
        }
    }
}
