//! Wire vocabulary: identities, inbound requests, outbound events.
//!
//! Everything here uses plain serde derives (no internal tagging) so the whole
//! set stays bincode-compatible.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::ship::{Coord, Ship};

/// Stable identity of a registered player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Identity of a pending room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// Identity of a game, pending or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u32);

/// Identity of a live connection, allocated by the transport adapter.
/// Never serialized; it exists only inside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Outcome of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackStatus {
    Miss,
    Hit,
    Killed,
}

/// One occupant of a pending room as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOccupant {
    pub player: PlayerId,
    pub name: String,
}

/// One pending room as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub occupants: Vec<RoomOccupant>,
}

/// One row of the win table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub wins: u32,
}

/// Everything a client may ask the coordinator to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Register `name` or re-authenticate and rebind an existing registration.
    Register { name: String, password: String },
    /// Open a pending room with the sender as its first occupant.
    CreateRoom,
    /// Join a pending room; filling it spawns a game.
    JoinRoom { room: RoomId },
    /// Submit the sender's whole fleet for a game, exactly once.
    PlaceShips {
        game: GameId,
        ships: Vec<Ship>,
        player: PlayerId,
    },
    /// Attack a chosen cell of the opponent's board.
    Attack {
        game: GameId,
        target: Coord,
        player: PlayerId,
    },
    /// Attack a uniformly chosen cell that was not attacked before.
    RandomAttack { game: GameId, player: PlayerId },
}

/// Everything the coordinator can push to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Registration succeeded on this connection.
    Registered { name: String, player: PlayerId },
    /// The triggering request could not be applied; nothing changed.
    Rejected { code: ErrorCode, message: String },
    /// Current pending rooms (broadcast whenever rooms change).
    RoomList(Vec<RoomSummary>),
    /// Win table sorted by wins descending (broadcast on registration and wins).
    Leaderboard(Vec<LeaderboardEntry>),
    /// A room filled up and produced a game for this player.
    GameCreated { game: GameId, player: PlayerId },
    /// Both fleets are in; carries the receiving player's own fleet.
    GameStarted { ships: Vec<Ship>, turn: PlayerId },
    /// The player whose attack the game will now accept.
    TurnChanged { player: PlayerId },
    /// A resolved attack; halo reveals arrive as extra `Miss` results.
    AttackResult {
        position: Coord,
        player: PlayerId,
        status: AttackStatus,
    },
    /// Terminal notification for a game.
    GameFinished { winner: PlayerId },
}
