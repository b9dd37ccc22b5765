use axum::{response::IntoResponse, Json};
use serde_json::json;

use super::SERVICE_NAME;

/// Describes the service and its endpoints.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Chat Message Processing API",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "create_message": "POST /api/messages",
            "get_messages": "GET /api/messages/{session_id}",
            "health": "GET /health",
            "info": "GET /info",
            "readiness": "GET /ready"
        }
    }))
}

/// Name, version and a short description of the service.
pub async fn info() -> impl IntoResponse {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
    }))
}
