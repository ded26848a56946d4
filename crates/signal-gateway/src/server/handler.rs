//! WebSocket handler
//!
//! Accepts upgraded connections, classifies inbound frames, and tears
//! room membership down when the channel closes. Nothing here is fatal to
//! the process: a misbehaving connection only affects itself.

use crate::connection::Connection;
use crate::protocol::{ClientMessage, Outbound};
use crate::server::GatewayState;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// WebSocket signaling handler
pub async fn signal_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: axum::extract::ws::WebSocket) {
    // Create message channel for outgoing frames and register the connection
    let (tx, mut rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let connection = state.registry().register(tx);

    tracing::info!(connection_id = %connection.id(), "WebSocket connection established");

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Clone for the receive task
    let state_recv = state.clone();
    let connection_recv = connection.clone();

    // Task reading frames from the client
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    // Protocol is text-encoded; treat as malformed input
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Dropping binary frame"
                    );
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    tracing::trace!(connection_id = %connection_recv.id(), "Ping/Pong");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        connection_id = %connection_recv.id(),
                        "Client closed connection"
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    // Clone for the send task
    let connection_send = connection.clone();

    // Task draining the outbound queue onto the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame.into_text() {
                Ok(text) => {
                    if ws_sink.send(Message::Text(text.into())).await.is_err() {
                        tracing::debug!(
                            connection_id = %connection_send.id(),
                            "Failed to send frame, stopping writer"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_send.id(),
                        error = %e,
                        "Failed to serialize outbound frame"
                    );
                }
            }
        }

        // Close the WebSocket when the channel is closed
        let _ = ws_sink.close().await;
    });

    // Wait for either side of the connection to finish
    tokio::select! {
        _ = recv_task => {
            tracing::debug!(connection_id = %connection.id(), "Receive task ended");
        }
        _ = send_task => {
            tracing::debug!(connection_id = %connection.id(), "Send task ended");
        }
    }

    cleanup_connection(&state, &connection).await;
}

/// Handle a text frame from the client
///
/// A `join` goes to the room router; the other recognized types are relayed
/// verbatim. Frames that fail to parse are dropped silently and the
/// connection keeps being served.
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    match ClientMessage::from_json(text) {
        Ok(ClientMessage::Join { room }) => {
            if room.is_empty() {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "Dropping join with empty room key"
                );
                return;
            }
            state.router().join(connection, room).await;
        }
        Ok(_) => {
            state.router().relay(connection, text).await;
        }
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Dropping unparseable frame"
            );
        }
    }
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(connection_id = %connection.id(), "Cleaning up connection");

    state.router().leave(connection).await;
    state.registry().unregister(connection.id());
}
