use std::sync::Arc;

use crate::config::{SessionCredentials, UpstreamConfig};
use crate::domain::SessionCredential;
use crate::services::RelayError;
use crate::upstream::ConversationApi;

pub struct SessionService {
    api: Arc<dyn ConversationApi>,
    upstream_config: UpstreamConfig,
}

impl SessionService {
    pub fn new(api: Arc<dyn ConversationApi>, upstream_config: UpstreamConfig) -> Self {
        Self {
            api,
            upstream_config,
        }
    }

    /// Resolve the API key and workflow identifier for this request
    pub fn credentials(&self) -> Result<SessionCredentials, RelayError> {
        Ok(self.upstream_config.session_credentials()?)
    }

    /// Mint a client session upstream, keeping only the client secret
    pub async fn create_session(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<SessionCredential, RelayError> {
        let credential = self
            .api
            .create_session(&credentials.api_key, &credentials.workflow_id)
            .await?;

        tracing::info!("Issued client session for workflow {}", credentials.workflow_id);

        Ok(credential)
    }
}
