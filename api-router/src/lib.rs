use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{
    index::{index, info},
    liveness::live,
    messages::{create_message, list_messages},
    readiness::ready,
};

pub mod api_state;
pub mod error;
pub mod middleware_cors;
mod routes;

/// Router for the chat message API and its health probes.
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public probes and service description
    let probes = Router::new()
        .route("/", get(index))
        .route("/info", get(info))
        .route("/health", get(live))
        .route("/ready", get(ready));

    let messages = Router::new()
        .route("/api/messages", post(create_message))
        .route("/api/messages/", post(create_message))
        .route("/api/messages/{session_id}", get(list_messages));

    probes.merge(messages)
}
