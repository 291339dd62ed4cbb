use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::websocket::message::ClientMessage;
use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Bounded so one slow peer cannot hold the relay
    let (tx, mut rx) = mpsc::channel::<Message>(state.outbound_capacity);

    let connection_id = Uuid::new_v4();

    let joined = {
        let mut relay = state.relay.write().await;
        relay.connect(connection_id, tx)
    };

    if !joined {
        tracing::warn!("Maximum connection count reached, rejecting {}", connection_id);
        let _ = sender.close().await;
        return;
    }

    tracing::info!("Connection {} opened", connection_id);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_text_message(&state, connection_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!("Connection {} closed by peer", connection_id);
                break;
            }
            Ok(_) => {
                // Binary, ping and pong carry nothing for the game
            }
            Err(e) => {
                tracing::warn!("WebSocket error for {}: {}", connection_id, e);
                break;
            }
        }
    }

    cleanup_connection(&state, connection_id).await;
    send_task.abort();
}

/// Parse and dispatch one client message. Malformed input is logged and skipped.
async fn handle_text_message(state: &AppState, connection_id: Uuid, text: &str) {
    match ClientMessage::parse(text) {
        Ok(msg) => {
            let mut relay = state.relay.write().await;
            relay.dispatch(connection_id, msg);
        }
        Err(e) => {
            tracing::warn!("Malformed message from {}: {}", connection_id, e);
        }
    }
}

async fn cleanup_connection(state: &AppState, connection_id: Uuid) {
    let mut relay = state.relay.write().await;
    if relay.disconnect(&connection_id) {
        tracing::info!(
            "Connection {} removed. Remaining connections: {}",
            connection_id,
            relay.connection_count()
        );
    }
}
