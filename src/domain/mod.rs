pub mod conversation;
pub mod message;
pub mod run;
pub mod session;

pub use conversation::{ConversationReply, NO_REPLY_PLACEHOLDER};
pub use message::{MessageRole, ThreadMessage, latest_assistant_text};
pub use run::{Run, RunStatus};
pub use session::SessionCredential;
