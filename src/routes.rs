//! HTTP routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use hyperspace::{GenerateRequest, GenerateResponse};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ProxyError, ProxyResult};
use crate::rate_limit::rate_limit;
use crate::state::ProxyState;

const GENERATE_METHOD: &str = "generateContent";

/// Build the proxy router. Only the generate route is rate limited.
pub fn create_router(state: Arc<ProxyState>) -> Router {
    let limited = Router::new()
        .route("/v1beta/models/{target}", post(generate))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health))
        .merge(limited)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Split `{model}:generateContent` into the model id.
fn parse_target(target: &str) -> ProxyResult<&str> {
    match target.rsplit_once(':') {
        Some((model, GENERATE_METHOD)) if !model.is_empty() => Ok(model),
        _ => Err(ProxyError::UnknownMethod(target.to_string())),
    }
}

async fn generate(
    State(state): State<Arc<ProxyState>>,
    Path(target): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> ProxyResult<Json<GenerateResponse>> {
    let model = parse_target(&target)?;
    if request.contents.is_empty() {
        return Err(ProxyError::BadRequest("contents must not be empty".into()));
    }

    let response = state.upstream.generate_content(model, &request).await?;
    info!(
        model,
        turns = request.contents.len(),
        candidates = response.candidates.len(),
        "generate forwarded"
    );
    Ok(Json(response))
}
