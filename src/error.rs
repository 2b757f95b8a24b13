use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hyperspace::HyperError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("too many requests")]
    RateLimited,

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream error: {0}")]
    Upstream(#[from] HyperError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ProxyError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ProxyError::UnknownMethod(_) => (StatusCode::NOT_FOUND, "unknown_method"),
            ProxyError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ProxyError::Upstream(HyperError::Request(e)) if e.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout")
            }
            ProxyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ProxyError::Io(_) | ProxyError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut body = json!({
            "error": error_type,
            "message": self.to_string(),
        });
        if let ProxyError::Upstream(HyperError::Http { status, .. }) = &self {
            body["upstreamStatus"] = json!(status);
        }

        (status, Json(body)).into_response()
    }
}
