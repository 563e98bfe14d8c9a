use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{
    dto::{ChatRequest, ChatResponse},
    error::ApiError,
};
use crate::services::ConversationService;

pub const MISSING_MESSAGE: &str = "Missing 'message' in request body";
pub const INVALID_THREAD_ID: &str = "Invalid 'threadId' in request body";

/// Thread identifiers are interpolated into upstream URL paths.
fn is_valid_thread_id(id: &str) -> bool {
    id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub async fn send_message(
    State(service): State<Arc<ConversationService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    // Configuration is checked before the body is even looked at.
    let credentials = service.credentials()?;

    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected chat body: {}", rejection);
        ApiError::BadRequest(MISSING_MESSAGE.to_string())
    })?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_MESSAGE.to_string()))?;
    let thread_id = request.thread_id.filter(|id| !id.trim().is_empty());
    if thread_id.as_deref().is_some_and(|id| !is_valid_thread_id(id)) {
        return Err(ApiError::BadRequest(INVALID_THREAD_ID.to_string()));
    }

    let span = tracing::info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        resumed = thread_id.is_some()
    );

    let reply = service
        .send_message(&credentials, &message, thread_id)
        .instrument(span)
        .await?;

    Ok(Json(reply.into()))
}
