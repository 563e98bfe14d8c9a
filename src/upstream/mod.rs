pub mod client;
pub mod error;
pub mod models;

pub use client::OpenAiClient;
pub use error::UpstreamError;

use async_trait::async_trait;

use crate::domain::{Run, SessionCredential, ThreadMessage};

/// Calls the relay makes against the upstream conversational API. Every call
/// carries the caller-resolved API key so credential lookup stays at the
/// start of request handling.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    async fn create_session(
        &self,
        api_key: &str,
        workflow_id: &str,
    ) -> Result<SessionCredential, UpstreamError>;

    /// Returns the new thread's identifier.
    async fn create_thread(&self, api_key: &str) -> Result<String, UpstreamError>;

    async fn add_user_message(
        &self,
        api_key: &str,
        thread_id: &str,
        content: &str,
    ) -> Result<(), UpstreamError>;

    async fn create_run(
        &self,
        api_key: &str,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<Run, UpstreamError>;

    async fn get_run(
        &self,
        api_key: &str,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Run, UpstreamError>;

    /// Messages on the thread, newest first.
    async fn list_messages(
        &self,
        api_key: &str,
        thread_id: &str,
    ) -> Result<Vec<ThreadMessage>, UpstreamError>;
}
