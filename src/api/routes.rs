use axum::{
    Json, Router,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::CorsConfig;
use crate::middleware::cors_gate;
use crate::services::{ConversationService, SessionService};

use super::{dto::HealthResponse, error::ApiError, handlers};

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub conversation_service: Arc<ConversationService>,
    pub cors: Arc<CorsConfig>,
}

pub fn create_router(state: AppState) -> Router {
    let relay = Router::new()
        .route(
            "/api/session",
            post(handlers::create_session).with_state(state.session_service.clone()),
        )
        .route(
            "/api/chat",
            post(handlers::send_message).with_state(state.conversation_service.clone()),
        )
        // Panics become JSON 500s inside the gate so they still get CORS headers.
        .route_layer(CatchPanicLayer::custom(panic_response))
        .route_layer(middleware::from_fn_with_state(state.cors.clone(), cors_gate));

    Router::new()
        .route("/health", get(health_check))
        .merge(relay)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal("Internal Server Error".to_string()).into_response()
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}
