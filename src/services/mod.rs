pub mod conversation_service;
pub mod error;
pub mod session_service;
pub mod sleeper;

pub use conversation_service::ConversationService;
pub use error::RelayError;
pub use session_service::SessionService;
pub use sleeper::{Sleeper, TokioSleeper};
