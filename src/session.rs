//! Player accounts and the binding between live connections and identities.

use std::collections::HashMap;

use crate::config::MAX_NAME_LEN;
use crate::error::Error;
use crate::protocol::{ConnectionId, LeaderboardEntry, PlayerId};

/// A registered account. Identity is the name; the password is checked on
/// every registration of that name.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    password: String,
    pub wins: u32,
}

/// Registry of accounts, keyed both ways for login and display lookups.
#[derive(Debug)]
pub struct Players {
    by_id: HashMap<PlayerId, Player>,
    by_name: HashMap<String, PlayerId>,
    next_id: u32,
}

impl Default for Players {
    fn default() -> Self {
        Self::new()
    }
}

impl Players {
    pub fn new() -> Self {
        Players {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        }
    }

    /// Log a name in. A fresh name creates an account; a known name must
    /// present its original password and then resolves to the same id, so
    /// reconnecting players keep their win history. Names are capped at
    /// `MAX_NAME_LEN` bytes.
    pub fn register(&mut self, name: &str, password: &str) -> Result<PlayerId, Error> {
        if name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong(name.len()));
        }
        if let Some(&id) = self.by_name.get(name) {
            let player = &self.by_id[&id];
            if player.password == password {
                return Ok(id);
            }
            return Err(Error::InvalidCredentials(name.to_string()));
        }
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.by_id.insert(
            id,
            Player {
                id,
                name: name.to_string(),
                password: password.to_string(),
                wins: 0,
            },
        );
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Display name for `id`, empty if unknown.
    pub fn name_of(&self, id: PlayerId) -> &str {
        self.by_id.get(&id).map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn record_win(&mut self, id: PlayerId) {
        if let Some(player) = self.by_id.get_mut(&id) {
            player.wins += 1;
        }
    }

    /// All accounts ordered by wins descending; ties keep registration order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut players: Vec<&Player> = self.by_id.values().collect();
        players.sort_by_key(|p| (core::cmp::Reverse(p.wins), p.id));
        players
            .into_iter()
            .map(|p| LeaderboardEntry {
                name: p.name.clone(),
                wins: p.wins,
            })
            .collect()
    }
}

/// Live connection-to-player bindings. A player has at most one connection
/// and a connection at most one player; rebinding displaces the old entry on
/// both sides.
#[derive(Debug, Default)]
pub struct Connections {
    player_by_conn: HashMap<ConnectionId, PlayerId>,
    conn_by_player: HashMap<PlayerId, ConnectionId>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `conn` to `player`, detaching whatever either side was bound
    /// to before.
    pub fn bind(&mut self, conn: ConnectionId, player: PlayerId) {
        if let Some(old_player) = self.player_by_conn.insert(conn, player) {
            if old_player != player {
                self.conn_by_player.remove(&old_player);
            }
        }
        if let Some(old_conn) = self.conn_by_player.insert(player, conn) {
            if old_conn != conn {
                self.player_by_conn.remove(&old_conn);
            }
        }
    }

    pub fn player_of(&self, conn: ConnectionId) -> Option<PlayerId> {
        self.player_by_conn.get(&conn).copied()
    }

    pub fn conn_of(&self, player: PlayerId) -> Option<ConnectionId> {
        self.conn_by_player.get(&player).copied()
    }

    /// Drop the binding for a closing connection. Returns the player it held,
    /// or `None` when the connection never registered or was displaced by a
    /// later login from another connection.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let player = self.player_by_conn.remove(&conn)?;
        self.conn_by_player.remove(&player);
        Some(player)
    }
}
