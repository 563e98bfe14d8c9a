//! reqwest implementation of [`ConversationApi`] against the OpenAI REST API.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::models::{
    CreateMessageBody, CreateRunBody, CreateSessionBody, MessageList, RunObject, SessionObject,
    ThreadObject,
};
use super::{ConversationApi, UpstreamError};
use crate::config::UpstreamConfig;
use crate::domain::{Run, SessionCredential, ThreadMessage};

const BETA_HEADER: &str = "OpenAI-Beta";

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    session_beta: String,
    assistants_beta: String,
}

impl OpenAiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        tracing::info!("Upstream base URL: {}", config.base_url);

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_beta: config.session_beta.clone(),
            assistants_beta: config.assistants_beta.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, api_key: &str, beta: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .header(BETA_HEADER, beta)
    }

    fn assistants(&self, method: Method, path: &str, api_key: &str) -> RequestBuilder {
        self.request(method, path, api_key, &self.assistants_beta)
    }

    /// Sends the request and decodes a success body. A non-success status is
    /// logged with the raw upstream body before it is returned as an error.
    async fn send<T: DeserializeOwned>(
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %text,
                "Upstream {} failed",
                operation
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| UpstreamError::Decode(format!("{}: {}", operation, e)))
    }
}

#[async_trait]
impl ConversationApi for OpenAiClient {
    async fn create_session(
        &self,
        api_key: &str,
        workflow_id: &str,
    ) -> Result<SessionCredential, UpstreamError> {
        let request = self
            .request(Method::POST, "/chatkit/sessions", api_key, &self.session_beta)
            .json(&CreateSessionBody { workflow_id });

        let session: SessionObject = Self::send(request, "session creation").await?;
        let client_secret = session.client_secret.ok_or_else(|| {
            UpstreamError::Decode("session creation: response has no client_secret".to_string())
        })?;

        Ok(SessionCredential { client_secret })
    }

    async fn create_thread(&self, api_key: &str) -> Result<String, UpstreamError> {
        let request = self
            .assistants(Method::POST, "/threads", api_key)
            .json(&serde_json::json!({}));

        let thread: ThreadObject = Self::send(request, "thread creation").await?;
        Ok(thread.id)
    }

    async fn add_user_message(
        &self,
        api_key: &str,
        thread_id: &str,
        content: &str,
    ) -> Result<(), UpstreamError> {
        let request = self
            .assistants(
                Method::POST,
                &format!("/threads/{}/messages", thread_id),
                api_key,
            )
            .json(&CreateMessageBody {
                role: "user",
                content,
            });

        let _: serde_json::Value = Self::send(request, "message append").await?;
        Ok(())
    }

    async fn create_run(
        &self,
        api_key: &str,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<Run, UpstreamError> {
        let request = self
            .assistants(Method::POST, &format!("/threads/{}/runs", thread_id), api_key)
            .json(&CreateRunBody { assistant_id });

        let run: RunObject = Self::send(request, "run start").await?;
        Ok(run.into())
    }

    async fn get_run(
        &self,
        api_key: &str,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Run, UpstreamError> {
        let request = self.assistants(
            Method::GET,
            &format!("/threads/{}/runs/{}", thread_id, run_id),
            api_key,
        );

        let run: RunObject = Self::send(request, "run status fetch").await?;
        Ok(run.into())
    }

    async fn list_messages(
        &self,
        api_key: &str,
        thread_id: &str,
    ) -> Result<Vec<ThreadMessage>, UpstreamError> {
        let request = self
            .assistants(
                Method::GET,
                &format!("/threads/{}/messages", thread_id),
                api_key,
            )
            .query(&[("order", "desc")]);

        let list: MessageList = Self::send(request, "message listing").await?;
        Ok(list.data.into_iter().map(Into::into).collect())
    }
}
