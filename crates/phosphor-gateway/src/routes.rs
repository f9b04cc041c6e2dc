use crate::identity::client_identity;
use crate::limiter::RateLimiter;
use crate::upstream::{Assistant, UpstreamError};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use phosphor_core::chat::REMAINING_HEADER;
use phosphor_core::ChatRequest;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub assistant: Arc<dyn Assistant>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn failure(status: StatusCode, code: &'static str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn with_remaining(mut resp: Response, remaining: u32) -> Response {
    resp.headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(remaining));
    resp
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let identity = client_identity(&headers);

    let decision = state.limiter.check(&identity).await;
    if !decision.allowed {
        info!(%identity, "refused: rate limited");
        return with_remaining(failure(StatusCode::TOO_MANY_REQUESTS, "rate_limited"), 0);
    }

    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            info!(%identity, "bad request: {e}");
            return failure(StatusCode::BAD_REQUEST, "bad_request");
        }
    };
    let message = request.message.trim();
    if message.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "bad_request");
    }

    info!(%identity, remaining = decision.remaining, turns = request.history.len(), "accepted");

    match state.assistant.reply(&request.history, message).await {
        Ok(stream) => {
            let logged = stream.map(move |chunk| {
                if let Err(e) = &chunk {
                    warn!("reply stream ended early: {e}");
                }
                chunk
            });
            let mut resp = Response::new(Body::from_stream(logged));
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            with_remaining(resp, decision.remaining)
        }
        Err(UpstreamError::Quota(status)) => {
            warn!(status, "upstream refused the account");
            failure(StatusCode::PAYMENT_REQUIRED, "quota_exceeded")
        }
        Err(UpstreamError::RateLimited) => {
            warn!("upstream is rate limiting");
            failure(StatusCode::TOO_MANY_REQUESTS, "rate_limited")
        }
        Err(e) => {
            error!("upstream failed: {e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "server_error")
        }
    }
}
