use axum::extract::ws;
use std::collections::HashMap;
use tokio::sync::mpsc::Sender as TokioMpscSender;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    NameTaken,
    AlreadyJoined,
}

/// Tracks every open socket plus the joined-player name maps.
///
/// The `names` and `handles` maps are mutual inverses at all times: a name is
/// either absent from both or present in both. `roster` keeps joined names in
/// insertion order, which vote aggregation and the lobby roster depend on.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sockets: HashMap<Uuid, TokioMpscSender<ws::Message>>,
    names: HashMap<Uuid, String>,
    handles: HashMap<String, Uuid>,
    roster: Vec<String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an open socket. The connection is not a player until it
    /// joins with a name.
    pub fn attach(&mut self, client_id: Uuid, client_tx: TokioMpscSender<ws::Message>) {
        self.sockets.insert(client_id, client_tx);
    }

    /// Removes a socket and, if it had joined, its name mappings.
    /// Returns the removed name so the caller can broadcast the new roster.
    pub fn detach(&mut self, client_id: Uuid) -> Option<String> {
        self.sockets.remove(&client_id);
        let name = self.names.remove(&client_id)?;
        self.handles.remove(&name);
        self.roster.retain(|n| n != &name);
        Some(name)
    }

    /// Associates a display name with a connection. Collisions are exact,
    /// case-sensitive matches. A handle that already joined cannot join
    /// again: a mid-round rename would strand its ballot under the old name
    /// and quorum could never be reached.
    pub fn join(&mut self, client_id: Uuid, name: &str) -> Result<(), JoinError> {
        if self.names.contains_key(&client_id) {
            return Err(JoinError::AlreadyJoined);
        }
        if self.handles.contains_key(name) {
            return Err(JoinError::NameTaken);
        }
        self.names.insert(client_id, name.to_string());
        self.handles.insert(name.to_string(), client_id);
        self.roster.push(name.to_string());
        Ok(())
    }

    pub fn name_of(&self, client_id: Uuid) -> Option<&str> {
        self.names.get(&client_id).map(String::as_str)
    }

    pub fn sender_of(&self, client_id: Uuid) -> Option<&TokioMpscSender<ws::Message>> {
        self.sockets.get(&client_id)
    }

    /// Joined names in insertion order.
    pub fn list_names(&self) -> Vec<String> {
        self.roster.clone()
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    /// Joined players with their handles, in insertion order.
    pub fn joined(&self) -> Vec<(String, Uuid)> {
        self.roster
            .iter()
            .filter_map(|name| self.handles.get(name).map(|id| (name.clone(), *id)))
            .collect()
    }

    pub fn joined_senders(
        &self,
    ) -> impl Iterator<Item = (&str, &TokioMpscSender<ws::Message>)> {
        self.roster.iter().filter_map(|name| {
            let id = self.handles.get(name)?;
            Some((name.as_str(), self.sockets.get(id)?))
        })
    }

    /// Case-insensitive lookup used only for resolving free-text vote
    /// targets; join collisions stay case-sensitive.
    pub fn resolve_case_insensitive(&self, target: &str) -> Option<String> {
        let target = target.trim().to_lowercase();
        self.roster
            .iter()
            .find(|name| name.to_lowercase() == target)
            .cloned()
    }
}
