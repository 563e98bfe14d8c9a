use std::sync::Arc;

use crate::config::{ConversationCredentials, PollConfig, UpstreamConfig};
use crate::domain::{ConversationReply, NO_REPLY_PLACEHOLDER, Run, RunStatus, latest_assistant_text};
use crate::services::{RelayError, Sleeper, TokioSleeper};
use crate::upstream::ConversationApi;

pub struct ConversationService {
    api: Arc<dyn ConversationApi>,
    upstream_config: UpstreamConfig,
    poll: PollConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl ConversationService {
    pub fn new(
        api: Arc<dyn ConversationApi>,
        upstream_config: UpstreamConfig,
        poll: PollConfig,
    ) -> Self {
        Self {
            api,
            upstream_config,
            poll,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Resolve the API key and assistant identifier for this request
    pub fn credentials(&self) -> Result<ConversationCredentials, RelayError> {
        Ok(self.upstream_config.conversation_credentials()?)
    }

    /// Relay one user message and wait for the assistant's reply.
    ///
    /// Reuses `thread_id` when given, otherwise opens a new thread. Upstream
    /// calls run strictly in order: message append, run start, status polls,
    /// message listing. Any non-success upstream status aborts the sequence.
    pub async fn send_message(
        &self,
        credentials: &ConversationCredentials,
        message: &str,
        thread_id: Option<String>,
    ) -> Result<ConversationReply, RelayError> {
        let api_key = credentials.api_key.as_str();

        let thread_id = match thread_id {
            Some(id) => id,
            None => {
                let id = self.api.create_thread(api_key).await?;
                tracing::info!("Created thread {}", id);
                id
            }
        };

        self.api
            .add_user_message(api_key, &thread_id, message)
            .await?;

        let run = self
            .api
            .create_run(api_key, &thread_id, &credentials.assistant_id)
            .await?;
        tracing::debug!("Started run {} on thread {} ({})", run.id, thread_id, run.status);

        let status = self.wait_for_run(api_key, &thread_id, run).await?;

        if !status.is_completed() {
            tracing::warn!("Run on thread {} ended as {}", thread_id, status);
            return Ok(ConversationReply::NotCompleted { status, thread_id });
        }

        let messages = self.api.list_messages(api_key, &thread_id).await?;
        let reply =
            latest_assistant_text(&messages).unwrap_or_else(|| NO_REPLY_PLACEHOLDER.to_string());

        Ok(ConversationReply::Completed { reply, thread_id })
    }

    /// Poll the run until it leaves queued/in_progress or the attempt budget
    /// is spent. Returns the last observed status, which may still be pending.
    async fn wait_for_run(
        &self,
        api_key: &str,
        thread_id: &str,
        run: Run,
    ) -> Result<RunStatus, RelayError> {
        let mut status = run.status;
        let mut attempts = 0;

        while status.is_pending() && attempts < self.poll.max_attempts {
            self.sleeper.sleep(self.poll.interval).await;
            status = self.api.get_run(api_key, thread_id, &run.id).await?.status;
            attempts += 1;
            tracing::debug!("Run {} poll {}: {}", run.id, attempts, status);
        }

        if status.is_pending() {
            tracing::warn!(
                "Run {} still {} after {} polls",
                run.id,
                status,
                attempts
            );
        }

        Ok(status)
    }
}
