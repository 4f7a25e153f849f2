//! Axum WebSocket upgrade handlers for both connection classes.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;

use super::connection::{run_consumer, run_producer};
use crate::app_state::AppState;

/// Upgrades any request on the producer port to a producer connection.
pub async fn producer_ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(move |error| {
        tracing::warn!(remote = %remote_addr, %error, "game client upgrade failed");
    })
    .on_upgrade(move |socket| run_producer(socket, remote_addr, state))
}

/// Upgrades any request on the consumer port to a consumer connection.
pub async fn consumer_ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(move |error| {
        tracing::warn!(remote = %remote_addr, %error, "web client upgrade failed");
    })
    .on_upgrade(move |socket| run_consumer(socket, remote_addr, state))
}

/// Router for the producer listener. Every path accepts an upgrade.
pub fn producer_router(state: AppState) -> Router {
    Router::new().fallback(producer_ws_handler).with_state(state)
}

/// Router for the consumer listener. Every path accepts an upgrade.
pub fn consumer_router(state: AppState) -> Router {
    Router::new().fallback(consumer_ws_handler).with_state(state)
}
