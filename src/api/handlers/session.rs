use axum::{Json, extract::State};
use std::sync::Arc;

use crate::api::{dto::SessionResponse, error::ApiError};
use crate::services::SessionService;

/// The request body is ignored; only the client secret is returned.
pub async fn create_session(
    State(service): State<Arc<SessionService>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let credentials = service.credentials()?;

    let session = service.create_session(&credentials).await?;

    Ok(Json(SessionResponse {
        client_secret: session.client_secret,
    }))
}
