use axum::extract::ws;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::content::WordDeck;
use crate::game::GameSession;
use crate::game::messages::client_message_from_ws_text;

#[derive(Debug)]
pub enum SessionMessage {
    ClientConnected {
        client_id: Uuid,
        client_tx: mpsc::Sender<ws::Message>,
    },
    ClientEvent {
        client_id: Uuid,
        raw_payload: String,
    },
    ClientDisconnected {
        client_id: Uuid,
    },
}

/// Single-writer owner of the process's one [`GameSession`]. Connection
/// tasks only ever talk to it through a [`SessionHandle`], so every inbound
/// message is handled to completion before the next one is picked up.
pub struct SessionActor {
    receiver: mpsc::Receiver<SessionMessage>,
    game: GameSession,
}

impl SessionActor {
    fn new(receiver: mpsc::Receiver<SessionMessage>, deck: WordDeck) -> Self {
        SessionActor {
            receiver,
            game: GameSession::new(deck),
        }
    }

    #[tracing::instrument(skip(self, msg), fields(
        msg_type = %std::any::type_name_of_val(&msg)
    ))]
    async fn handle_message(&mut self, msg: SessionMessage) {
        match msg {
            SessionMessage::ClientConnected {
                client_id,
                client_tx,
            } => {
                tracing::debug!(client.id = %client_id, "Client connected");
                self.game.client_connected(client_id, client_tx).await;
            }
            SessionMessage::ClientEvent {
                client_id,
                raw_payload,
            } => {
                tracing::trace!(client.id = %client_id, event.raw = %raw_payload, "Raw event from client");
                match client_message_from_ws_text(&raw_payload) {
                    Ok(parsed) => {
                        self.game.handle_command(client_id, parsed).await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            client.id = %client_id,
                            error = %e,
                            event.raw = %raw_payload,
                            "Failed to deserialize event from client"
                        );
                        self.game.send_error(client_id, "Invalid message format").await;
                    }
                }
            }
            SessionMessage::ClientDisconnected { client_id } => {
                tracing::debug!(client.id = %client_id, "Client disconnected");
                self.game.client_disconnected(client_id).await;
            }
        }
    }
}

#[tracing::instrument(skip(actor))]
pub async fn run_session_actor(mut actor: SessionActor) {
    tracing::info!("Session actor started");
    while let Some(msg) = actor.receiver.recv().await {
        actor.handle_message(msg).await;
    }
    // The session outlives its players; this only happens at shutdown.
    tracing::info!("Session actor stopped");
}

#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    pub fn spawn(buffer_size: usize, deck: WordDeck) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = SessionActor::new(receiver, deck);
        tokio::spawn(run_session_actor(actor));
        Self { sender }
    }

    pub async fn client_connected(&self, client_id: Uuid, client_tx: mpsc::Sender<ws::Message>) {
        if self
            .sender
            .send(SessionMessage::ClientConnected {
                client_id,
                client_tx,
            })
            .await
            .is_err()
        {
            tracing::error!("Failed to send ClientConnected to session actor");
        }
    }

    pub async fn forward_client_event(
        &self,
        client_id: Uuid,
        raw_payload: String,
    ) -> Result<(), String> {
        self.sender
            .send(SessionMessage::ClientEvent {
                client_id,
                raw_payload,
            })
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    pub async fn client_disconnected(&self, client_id: Uuid) {
        if self
            .sender
            .send(SessionMessage::ClientDisconnected { client_id })
            .await
            .is_err()
        {
            tracing::error!("Failed to send ClientDisconnected to session actor");
        }
    }
}
