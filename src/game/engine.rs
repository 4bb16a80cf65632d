use axum::extract::ws;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashSet;
use tokio::sync::mpsc::Sender as TokioMpscSender;
use uuid::Uuid;

use crate::content::WordDeck;

use super::commands::{SlashCommand, parse_slash_command};
use super::messages::{ClientMessage, Phase, RoleReveal, ServerMessage, Winner};
use super::registry::{ConnectionRegistry, JoinError};

const MIN_PLAYERS: usize = 2;

/// The one game session of the process.
///
/// All mutation happens inside the session actor task, so every command
/// handler runs to completion without interleaving with another handler.
/// Outbound sends are best-effort; a dead client never aborts a broadcast.
#[derive(Debug)]
pub struct GameSession {
    registry: ConnectionRegistry,
    status: Phase,
    current_word: String,
    current_hint: String,
    impostor: String,
    /// Voter to target, in first-vote order. A re-vote overwrites the target
    /// but keeps the voter's original slot, which the tie-break depends on.
    votes: Vec<(String, String)>,
    /// Re-aggregated in full after every ledger change. Fine at lobby scale.
    vote_counts: Vec<(String, usize)>,
    /// Voters whose anonymous "a player has voted" announcement already went
    /// out, so re-votes do not repeat it.
    voters_notified: HashSet<String>,
    deck: WordDeck,
}

impl GameSession {
    pub fn new(deck: WordDeck) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            status: Phase::Lobby,
            current_word: String::new(),
            current_hint: String::new(),
            impostor: String::new(),
            votes: Vec::new(),
            vote_counts: Vec::new(),
            voters_notified: HashSet::new(),
            deck,
        }
    }

    pub async fn client_connected(
        &mut self,
        client_id: Uuid,
        client_tx: TokioMpscSender<ws::Message>,
    ) {
        tracing::debug!(client.id = %client_id, "Socket attached");
        self.registry.attach(client_id, client_tx);
    }

    /// Removes the connection and, if it was a player, reruns the quorum
    /// check: dropping a non-voter can itself complete quorum.
    pub async fn client_disconnected(&mut self, client_id: Uuid) {
        let Some(name) = self.registry.detach(client_id) else {
            tracing::debug!(client.id = %client_id, "Unjoined socket detached");
            return;
        };
        tracing::info!(client.id = %client_id, player.name = %name, "Player left");

        self.broadcast(ServerMessage::LobbyUpdate {
            players: self.registry.list_names(),
        })
        .await;

        self.votes.retain(|(voter, _)| voter != &name);
        self.voters_notified.remove(&name);
        self.vote_counts = tally(&self.votes);

        if matches!(self.status, Phase::Discussion | Phase::Voting)
            && self.votes.len() == self.registry.player_count()
        {
            self.resolve().await;
        }
    }

    pub async fn handle_command(&mut self, client_id: Uuid, message: ClientMessage) {
        match message {
            ClientMessage::Join { name } => self.handle_join(client_id, name).await,
            ClientMessage::Chat { text } => self.handle_chat(client_id, &text).await,
            ClientMessage::StartGame => self.handle_start_game(client_id).await,
            ClientMessage::GetRole => self.handle_get_role(client_id).await,
        }
    }

    pub async fn send_error(&self, client_id: Uuid, message: &str) {
        self.send_to(
            client_id,
            ServerMessage::Error {
                message: message.to_string(),
            },
        )
        .await;
    }

    async fn handle_join(&mut self, client_id: Uuid, name: String) {
        match self.registry.join(client_id, &name) {
            Ok(()) => {
                tracing::info!(client.id = %client_id, player.name = %name, "Player joined");
                self.broadcast(ServerMessage::LobbyUpdate {
                    players: self.registry.list_names(),
                })
                .await;
            }
            Err(JoinError::NameTaken) => {
                tracing::debug!(client.id = %client_id, player.name = %name, "Join rejected, name taken");
                self.send_error(client_id, "Name already taken").await;
            }
            Err(JoinError::AlreadyJoined) => {
                tracing::debug!(client.id = %client_id, player.name = %name, "Join rejected, already joined");
                self.send_error(client_id, "You have already joined").await;
            }
        }
    }

    async fn handle_chat(&mut self, client_id: Uuid, text: &str) {
        if text.trim_start().starts_with('/') {
            match parse_slash_command(text) {
                Some(SlashCommand::Vote { target }) => self.cast_vote(client_id, &target).await,
                // Unknown slash commands vanish without a reply; which
                // commands exist is never revealed.
                None => {
                    tracing::trace!(client.id = %client_id, "Dropping unrecognized slash command");
                }
            }
            return;
        }

        let from = self
            .registry
            .name_of(client_id)
            .unwrap_or("Unknown")
            .to_string();
        self.broadcast(ServerMessage::Chat {
            from,
            text: text.to_string(),
        })
        .await;
    }

    async fn handle_start_game(&mut self, client_id: Uuid) {
        if self.status != Phase::Lobby {
            tracing::trace!(client.id = %client_id, status = ?self.status, "start_game ignored outside lobby");
            return;
        }
        if self.registry.player_count() < MIN_PLAYERS {
            self.send_error(client_id, "At least 2 players are needed to start")
                .await;
            return;
        }

        let pair = self.deck.next_round();
        let names = self.registry.list_names();
        let impostor = match names.choose(&mut thread_rng()) {
            Some(name) => name.clone(),
            // Unreachable given the player-count check.
            None => return,
        };

        self.current_word = pair.word;
        self.current_hint = pair.hint;
        self.impostor = impostor;
        self.votes.clear();
        self.vote_counts.clear();
        self.voters_notified.clear();
        self.status = Phase::Discussion;

        tracing::info!(
            players.count = names.len(),
            impostor = %self.impostor,
            "Round started"
        );

        for (name, id) in self.registry.joined() {
            let reveal = self.role_for(&name);
            self.send_to(id, ServerMessage::Role(reveal)).await;
        }

        self.broadcast(ServerMessage::PhaseChange {
            phase: Phase::Discussion,
            message: "The round has started. Discuss!".to_string(),
        })
        .await;
    }

    async fn handle_get_role(&mut self, client_id: Uuid) {
        if self.status == Phase::Lobby {
            tracing::trace!(client.id = %client_id, "get_role ignored in lobby");
            return;
        }
        let Some(name) = self.registry.name_of(client_id) else {
            return;
        };
        let reveal = self.role_for(name);
        self.send_to(client_id, ServerMessage::Role(reveal)).await;
    }

    fn role_for(&self, name: &str) -> RoleReveal {
        if name == self.impostor {
            RoleReveal::Impostor {
                hint: self.current_hint.clone(),
            }
        } else {
            RoleReveal::Innocent {
                word: self.current_word.clone(),
            }
        }
    }

    async fn cast_vote(&mut self, client_id: Uuid, target_text: &str) {
        let Some(voter) = self.registry.name_of(client_id).map(str::to_owned) else {
            tracing::trace!(client.id = %client_id, "Vote from unjoined connection ignored");
            return;
        };
        if !matches!(self.status, Phase::Discussion | Phase::Voting) {
            // Voting unavailable is invisible on purpose.
            tracing::trace!(player.name = %voter, status = ?self.status, "Vote ignored, voting unavailable");
            return;
        }

        let Some(target) = self.registry.resolve_case_insensitive(target_text) else {
            self.send_error(
                client_id,
                &format!("No player named '{}'", target_text.trim()),
            )
            .await;
            return;
        };
        if target == voter {
            self.send_error(client_id, "You cannot vote for yourself").await;
            return;
        }

        // The first valid vote of the round opens voting for everyone.
        if self.status == Phase::Discussion {
            self.status = Phase::Voting;
            self.broadcast(ServerMessage::PhaseChange {
                phase: Phase::Voting,
                message: "Voting has begun".to_string(),
            })
            .await;
        }

        match self.votes.iter_mut().find(|(v, _)| v == &voter) {
            Some(entry) => entry.1 = target.clone(),
            None => self.votes.push((voter.clone(), target.clone())),
        }
        self.vote_counts = tally(&self.votes);

        if self.voters_notified.insert(voter.clone()) {
            self.broadcast(ServerMessage::System {
                message: "A player has voted".to_string(),
            })
            .await;
        }

        self.broadcast(ServerMessage::VoteUpdate {
            total_votes: self.votes.len(),
            required_votes: self.registry.player_count(),
        })
        .await;

        if self.votes.len() == self.registry.player_count() {
            self.resolve().await;
        }

        self.send_to(
            client_id,
            ServerMessage::System {
                message: format!("You voted for {}", target),
            },
        )
        .await;
    }

    /// Terminal computation of the round: picks the voted-out player,
    /// reveals everything, then resets to the lobby.
    async fn resolve(&mut self) {
        self.status = Phase::Ended;

        let voted_out = leader(&self.vote_counts).map(|(name, _)| name.clone());
        let (winner, message) = match &voted_out {
            Some(name) if *name == self.impostor => (
                Winner::Innocents,
                format!(
                    "{} was voted out. They were the impostor. The innocents win!",
                    name
                ),
            ),
            Some(name) => (
                Winner::Impostor,
                format!(
                    "{} was voted out, but the impostor was {}. The impostor wins!",
                    name, self.impostor
                ),
            ),
            // Quorum with an empty ledger: every voter disconnected without
            // voting. The impostor escapes.
            None => (
                Winner::Impostor,
                "No votes were cast. The impostor wins!".to_string(),
            ),
        };

        tracing::info!(
            winner = ?winner,
            voted_out = ?voted_out,
            impostor = %self.impostor,
            "Round resolved"
        );

        self.broadcast(ServerMessage::GameResult {
            winner,
            message,
            impostor: self.impostor.clone(),
            word: self.current_word.clone(),
            hint: self.current_hint.clone(),
        })
        .await;

        // Back to the lobby. Word and impostor stay stale until the next
        // round overwrites them.
        self.status = Phase::Lobby;
        self.votes.clear();
        self.vote_counts.clear();
        self.voters_notified.clear();
    }

    async fn send_to(&self, client_id: Uuid, message: ServerMessage) {
        let Some(tx) = self.registry.sender_of(client_id) else {
            return;
        };
        match message.to_ws_text() {
            Ok(ws_msg) => {
                if tx.send(ws_msg).await.is_err() {
                    tracing::warn!(client.id = %client_id, "Failed to send message to client");
                }
            }
            Err(e) => {
                tracing::error!(client.id = %client_id, error = %e, "Failed to serialize message");
            }
        }
    }

    async fn broadcast(&self, message: ServerMessage) {
        let ws_msg = match message.to_ws_text() {
            Ok(ws_msg) => ws_msg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize broadcast message");
                return;
            }
        };
        for (name, tx) in self.registry.joined_senders() {
            if tx.send(ws_msg.clone()).await.is_err() {
                tracing::warn!(player.name = %name, "Failed to broadcast to player");
            }
        }
    }
}

/// Aggregates the ledger by target in first-appearance order. The order
/// matters: ties at resolution go to the candidate that reached the maximum
/// first.
fn tally(votes: &[(String, String)]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for (_, target) in votes {
        match counts.iter_mut().find(|(name, _)| name == target) {
            Some(entry) => entry.1 += 1,
            None => counts.push((target.clone(), 1)),
        }
    }
    counts
}

/// First candidate with the maximum count; later candidates replace the
/// leader only with a strictly greater count.
fn leader(counts: &[(String, usize)]) -> Option<&(String, usize)> {
    let mut best: Option<&(String, usize)> = None;
    for entry in counts {
        match best {
            Some(current) if entry.1 > current.1 => best = Some(entry),
            None => best = Some(entry),
            _ => {}
        }
    }
    best
}
