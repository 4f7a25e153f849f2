//! Per-connection lifecycle for producer and consumer sockets.
//!
//! Each accepted socket runs in its own task. The task registers the
//! connection, pumps frames until the peer closes or errors, and then
//! unregisters it exactly once.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};

use crate::app_state::AppState;
use crate::domain::{
    ConnectionHandle, ConnectionRegistry, ConnectionState, OutboundFrame, Payload, WelcomeMessage,
};

/// Characters of a producer payload included in debug logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Runs a producer ("game") connection.
///
/// Every text or binary frame is handed to the broadcast relay in the
/// order it was received. Nothing is ever written back to the producer.
pub async fn run_producer(mut socket: WebSocket, remote_addr: SocketAddr, state: AppState) {
    let handle = ConnectionHandle::producer(remote_addr);
    if !state.registry.register(handle.clone()).await {
        return;
    }
    tracing::info!(remote = %remote_addr, connection_id = %handle.id(), "game client connected");

    while let Some(msg) = socket.recv().await {
        let payload = match msg {
            Ok(Message::Text(text)) => Payload::Text(text),
            Ok(Message::Binary(bytes)) => Payload::Binary(bytes),
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Err(error) => {
                tracing::warn!(remote = %remote_addr, %error, "game client error");
                break;
            }
        };

        let preview = payload.preview(LOG_PREVIEW_CHARS);
        tracing::debug!(
            remote = %remote_addr,
            len = payload.len(),
            preview = preview.as_deref().unwrap_or("<binary>"),
            "received game data"
        );
        let report = state.relay.broadcast(payload).await;
        tracing::trace!(
            attempted = report.attempted,
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "broadcast complete"
        );
    }

    close(&state.registry, &handle).await;
    tracing::info!(remote = %remote_addr, connection_id = %handle.id(), "game client disconnected");
}

/// Runs a consumer ("web") connection.
///
/// Sends the welcome frame, then writes queued relay frames until the peer
/// goes away. Inbound data frames are discarded; the read half is polled
/// only to notice close and error.
pub async fn run_consumer(socket: WebSocket, remote_addr: SocketAddr, state: AppState) {
    let (handle, mut outbound_rx) =
        ConnectionHandle::consumer(remote_addr, state.config.consumer_queue_capacity);

    // Queued while still Connecting, so it precedes every relayed payload.
    let welcome = WelcomeMessage::new(state.config.welcome_message.as_str(), Utc::now());
    if let Err(error) = handle.try_send(OutboundFrame::Welcome(welcome)) {
        tracing::warn!(remote = %remote_addr, %error, "failed to queue welcome");
    }
    if !state.registry.register(handle.clone()).await {
        return;
    }
    tracing::info!(remote = %remote_addr, connection_id = %handle.id(), "web client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            frame = outbound_rx.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if let Err(error) = ws_tx.send(Message::from(frame)).await {
                    tracing::warn!(remote = %remote_addr, %error, "web client write failed");
                    break;
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        tracing::warn!(remote = %remote_addr, %error, "web client error");
                        break;
                    }
                }
            }
        }
    }

    close(&state.registry, &handle).await;
    tracing::info!(remote = %remote_addr, connection_id = %handle.id(), "web client disconnected");
}

/// Drives `Open → Closing → Closed`, unregistering in between.
async fn close(registry: &ConnectionRegistry, handle: &ConnectionHandle) {
    handle.transition(ConnectionState::Closing);
    if registry.unregister(handle.id()).await.is_none() {
        tracing::debug!(connection_id = %handle.id(), "connection already unregistered");
    }
    handle.transition(ConnectionState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn close_unregisters_and_is_terminal() {
        let registry = ConnectionRegistry::new();
        let handle = ConnectionHandle::producer(SocketAddr::from(([127, 0, 0, 1], 1)));
        let _ = registry.register(handle.clone()).await;

        close(&registry, &handle).await;
        close(&registry, &handle).await;

        assert_eq!(handle.state(), ConnectionState::Closed);
        assert_eq!(registry.counts().await.producers, 0);
    }
}
