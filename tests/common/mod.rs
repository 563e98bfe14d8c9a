// Shared fixtures for the router tests: an in-memory upstream that counts
// every call, and helpers to build the app and drive requests through it.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chat_relay::{
    api::{AppState, create_router},
    config::{
        CorsConfig, DEFAULT_FALLBACK_ORIGIN, DEFAULT_ORIGIN_PATTERN, PollConfig, UpstreamConfig,
    },
    domain::{MessageRole, Run, RunStatus, SessionCredential, ThreadMessage},
    services::{ConversationService, SessionService, Sleeper},
    upstream::{ConversationApi, UpstreamError},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// How runs started on the fake upstream behave.
#[derive(Clone)]
pub enum RunScript {
    /// The run completes on the first poll and the assistant says this.
    Reply(&'static str),
    /// The run reports this status forever.
    Stuck(RunStatus),
}

#[derive(Default)]
pub struct CallCounts {
    pub sessions: AtomicUsize,
    pub threads_created: AtomicUsize,
    pub messages_added: AtomicUsize,
    pub runs_started: AtomicUsize,
    pub status_fetches: AtomicUsize,
    pub message_lists: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.sessions,
            &self.threads_created,
            &self.messages_added,
            &self.runs_started,
            &self.status_fetches,
            &self.message_lists,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

pub struct InMemoryUpstream {
    script: RunScript,
    session_failure: Option<(u16, String)>,
    threads: Mutex<HashMap<String, Vec<ThreadMessage>>>,
    clock: AtomicI64,
    pub calls: CallCounts,
}

impl InMemoryUpstream {
    pub fn new(script: RunScript) -> Self {
        Self {
            script,
            session_failure: None,
            threads: Mutex::new(HashMap::new()),
            clock: AtomicI64::new(1_700_000_000),
            calls: CallCounts::default(),
        }
    }

    pub fn failing_sessions(status: u16, body: &str) -> Self {
        Self {
            session_failure: Some((status, body.to_string())),
            ..Self::new(RunScript::Reply("unused"))
        }
    }

    pub fn with_thread(self, thread_id: &str) -> Self {
        self.threads
            .lock()
            .unwrap()
            .insert(thread_id.to_string(), Vec::new());
        self
    }

    fn push(&self, thread_id: &str, role: MessageRole, text: &str) -> Result<(), UpstreamError> {
        let mut threads = self.threads.lock().unwrap();
        let messages = threads.get_mut(thread_id).ok_or_else(|| UpstreamError::Status {
            status: 404,
            body: format!("No thread found with id '{}'.", thread_id),
        })?;
        let created_at = self.clock.fetch_add(1, Ordering::SeqCst);
        messages.push(ThreadMessage {
            role,
            text_parts: vec![text.to_string()],
            created_at,
        });
        Ok(())
    }
}

#[async_trait]
impl ConversationApi for InMemoryUpstream {
    async fn create_session(
        &self,
        _api_key: &str,
        workflow_id: &str,
    ) -> Result<SessionCredential, UpstreamError> {
        self.calls.sessions.fetch_add(1, Ordering::SeqCst);
        if let Some((status, body)) = &self.session_failure {
            return Err(UpstreamError::Status {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(SessionCredential {
            client_secret: format!("ek_{}", workflow_id),
        })
    }

    async fn create_thread(&self, _api_key: &str) -> Result<String, UpstreamError> {
        self.calls.threads_created.fetch_add(1, Ordering::SeqCst);
        let id = format!("thread_{}", uuid::Uuid::new_v4().simple());
        self.threads.lock().unwrap().insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn add_user_message(
        &self,
        _api_key: &str,
        thread_id: &str,
        content: &str,
    ) -> Result<(), UpstreamError> {
        self.calls.messages_added.fetch_add(1, Ordering::SeqCst);
        self.push(thread_id, MessageRole::User, content)
    }

    async fn create_run(
        &self,
        _api_key: &str,
        thread_id: &str,
        _assistant_id: &str,
    ) -> Result<Run, UpstreamError> {
        self.calls.runs_started.fetch_add(1, Ordering::SeqCst);
        let status = match &self.script {
            RunScript::Reply(text) => {
                self.push(thread_id, MessageRole::Assistant, text)?;
                RunStatus::Queued
            }
            RunScript::Stuck(status) => status.clone(),
        };
        Ok(Run {
            id: "run_1".to_string(),
            status,
        })
    }

    async fn get_run(
        &self,
        _api_key: &str,
        _thread_id: &str,
        run_id: &str,
    ) -> Result<Run, UpstreamError> {
        self.calls.status_fetches.fetch_add(1, Ordering::SeqCst);
        let status = match &self.script {
            RunScript::Reply(_) => RunStatus::Completed,
            RunScript::Stuck(status) => status.clone(),
        };
        Ok(Run {
            id: run_id.to_string(),
            status,
        })
    }

    async fn list_messages(
        &self,
        _api_key: &str,
        thread_id: &str,
    ) -> Result<Vec<ThreadMessage>, UpstreamError> {
        self.calls.message_lists.fetch_add(1, Ordering::SeqCst);
        let threads = self.threads.lock().unwrap();
        let mut messages = threads.get(thread_id).cloned().unwrap_or_default();
        messages.reverse();
        Ok(messages)
    }
}

pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

pub fn upstream_config() -> UpstreamConfig {
    UpstreamConfig {
        base_url: "http://upstream.invalid/v1".to_string(),
        api_key: Some("sk-test".to_string()),
        workflow_id: Some("wf_123".to_string()),
        assistant_id: Some("asst_123".to_string()),
        session_beta: "chatkit_beta=v1".to_string(),
        assistants_beta: "assistants=v2".to_string(),
        timeout: Duration::from_secs(5),
    }
}

pub fn strict_cors() -> CorsConfig {
    CorsConfig::new(DEFAULT_ORIGIN_PATTERN, DEFAULT_FALLBACK_ORIGIN).unwrap()
}

/// Upstream whose session endpoint blows up inside the handler.
pub struct PanickingUpstream;

#[async_trait]
impl ConversationApi for PanickingUpstream {
    async fn create_session(
        &self,
        _api_key: &str,
        _workflow_id: &str,
    ) -> Result<SessionCredential, UpstreamError> {
        panic!("session backend unavailable")
    }

    async fn create_thread(&self, _api_key: &str) -> Result<String, UpstreamError> {
        panic!("thread backend unavailable")
    }

    async fn add_user_message(
        &self,
        _api_key: &str,
        _thread_id: &str,
        _content: &str,
    ) -> Result<(), UpstreamError> {
        unimplemented!()
    }

    async fn create_run(
        &self,
        _api_key: &str,
        _thread_id: &str,
        _assistant_id: &str,
    ) -> Result<Run, UpstreamError> {
        unimplemented!()
    }

    async fn get_run(
        &self,
        _api_key: &str,
        _thread_id: &str,
        _run_id: &str,
    ) -> Result<Run, UpstreamError> {
        unimplemented!()
    }

    async fn list_messages(
        &self,
        _api_key: &str,
        _thread_id: &str,
    ) -> Result<Vec<ThreadMessage>, UpstreamError> {
        unimplemented!()
    }
}

pub fn app_with<A>(upstream: Arc<A>, upstream_config: UpstreamConfig, cors: CorsConfig) -> Router
where
    A: ConversationApi + 'static,
{
    let session_service = Arc::new(SessionService::new(
        upstream.clone(),
        upstream_config.clone(),
    ));
    let conversation_service = Arc::new(
        ConversationService::new(upstream, upstream_config, PollConfig::default())
            .with_sleeper(Arc::new(NoopSleeper)),
    );

    create_router(AppState {
        session_service,
        conversation_service,
        cors: Arc::new(cors),
    })
}

pub fn app(upstream: Arc<InMemoryUpstream>) -> Router {
    app_with(upstream, upstream_config(), strict_cors())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    origin: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .oneshot(builder.body(body).expect("request build should succeed"))
        .await
        .expect("app should handle request");

    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("response body should be readable")
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}
