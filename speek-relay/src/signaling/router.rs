use crate::relay::RoomRelay;
use crate::signaling::ws_handler;
use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};

/// HTTP surface of the relay: `/ws` for signaling, `/` as a liveness probe.
pub fn router(relay: RoomRelay) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/ws", get(ws_handler))
        .with_state(relay)
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "speek relay is running" }))
}
