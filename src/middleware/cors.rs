//! CORS gate in front of the relay endpoints.
//!
//! Every response that passes through here, including preflight, 405 and
//! error responses produced further in, leaves with the CORS headers set
//! exactly once.

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, Method, Request, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::config::CorsConfig;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECS: &str = "86400";

/// Pick the single origin value to echo for a request origin.
pub fn resolve_origin(config: &CorsConfig, origin: Option<&str>) -> String {
    match origin {
        Some(origin) if config.allow_any || config.allowed_origins.is_match(origin) => {
            origin.to_string()
        }
        None if config.allow_any => "*".to_string(),
        _ => config.fallback_origin.clone(),
    }
}

pub async fn cors_gate(
    State(config): State<Arc<CorsConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = resolve_origin(
        &config,
        req.headers()
            .get(ORIGIN)
            .and_then(|header| header.to_str().ok()),
    );

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else if req.method() == Method::POST {
        next.run(req).await
    } else {
        ApiError::MethodNotAllowed.into_response()
    };

    apply_cors_headers(response.headers_mut(), &origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    match HeaderValue::from_str(origin) {
        Ok(value) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(_) => tracing::warn!("Refusing to echo unrepresentable origin {:?}", origin),
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
    headers.insert(VARY, HeaderValue::from_static("Origin"));
}
