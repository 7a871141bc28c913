mod detection;
mod form;
mod frame;
mod health;
mod metrics;

use crate::{error::RelayError, server::SharedState};
use axum::{
    http::{Method, Uri},
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/upload_frame",
            post(frame::upload_frame).fallback(method_not_allowed),
        )
        .route(
            "/get_frame",
            get(frame::get_frame).fallback(method_not_allowed),
        )
        .route(
            "/notification",
            post(detection::notification).fallback(method_not_allowed),
        )
        .route(
            "/get_detection",
            get(detection::get_detection).fallback(method_not_allowed),
        )
        .route("/health", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler))
}

async fn method_not_allowed(method: Method, uri: Uri) -> RelayError {
    tracing::debug!(%method, %uri, "Rejecting request method");
    RelayError::MethodNotAllowed
}
