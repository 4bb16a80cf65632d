use axum::extract::{
    State,
    ws::{self, WebSocket, WebSocketUpgrade},
};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::state::AppState;

pub async fn ws_handler(
    ws_upgrade: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    tracing::debug!("WebSocket: connection attempt");
    ws_upgrade.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Bridges one WebSocket to the session actor: a send task pumps actor
/// output to the socket, a receive task forwards inbound text frames, and
/// whichever finishes first tears the other down.
pub async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let client_id = Uuid::new_v4();
    tracing::info!(client.id = %client_id, "WebSocket client connected");

    let (actor_to_client_tx, mut actor_to_client_rx) = mpsc::channel::<ws::Message>(32);
    let session = app_state.session;
    session.client_connected(client_id, actor_to_client_tx).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = actor_to_client_rx.recv().await {
            if ws_sender.send(message).await.is_err() {
                tracing::debug!(
                    client.id = %client_id,
                    "WS send failed, client likely disconnected"
                );
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    let session_recv = session.clone();
    let mut recv_task = tokio::spawn(async move {
        loop {
            match ws_receiver.next().await {
                Some(Ok(ws::Message::Text(text))) => {
                    if let Err(e) = session_recv
                        .forward_client_event(client_id, text.to_string())
                        .await
                    {
                        tracing::error!(
                            client.id = %client_id,
                            error = %e,
                            "Failed to forward event to session actor"
                        );
                        break;
                    }
                }
                Some(Ok(ws::Message::Close(_))) => {
                    tracing::info!(client.id = %client_id, "WebSocket closed by client");
                    break;
                }
                Some(Ok(ws::Message::Binary(_))) => {
                    tracing::debug!(client.id = %client_id, "Binary message ignored");
                }
                // Axum answers pings itself.
                Some(Ok(ws::Message::Ping(_))) | Some(Ok(ws::Message::Pong(_))) => {}
                Some(Err(e)) => {
                    tracing::warn!(client.id = %client_id, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    session.client_disconnected(client_id).await;
    tracing::info!(client.id = %client_id, "WebSocket client fully disconnected");
}
