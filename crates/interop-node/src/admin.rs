//! # Admin Endpoint
//!
//! `GET /health` (JSON summary) and `GET /metrics` (Prometheus text).

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use qc_15_interop::{AtomicSwapApi, AtomicSwapEngine, InMemoryLedger, MessageRelay, MessageRelayApi};
use std::sync::Arc;

/// Handles shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    /// Swap engine (registry size).
    pub swaps: Arc<AtomicSwapEngine>,
    /// Relay (pool size).
    pub relay: Arc<MessageRelay>,
    /// Ledger (entry count).
    pub ledger: Arc<InMemoryLedger>,
}

/// Build the admin router.
pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn health_check(State(state): State<AdminState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": qc_15_interop::VERSION,
        "swaps": state.swaps.len(),
        "pending_messages": state.relay.pending_count(),
        "ledger_entries": state.ledger.len(),
    }))
}

async fn metrics() -> Response {
    match interop_telemetry::encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
