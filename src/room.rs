//! Pending rooms waiting for an opponent.

use std::collections::BTreeMap;

use crate::config::ROOM_CAPACITY;
use crate::error::Error;
use crate::protocol::{PlayerId, RoomId, RoomOccupant, RoomSummary};
use crate::session::Players;

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub occupants: Vec<PlayerId>,
}

/// Result of joining a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Room is still short of players; unreachable while the capacity is 2.
    Waiting,
    /// Room filled up and was consumed; these players go into a match.
    Ready([PlayerId; 2]),
}

/// All rooms that have not yet filled. BTreeMap keeps listings in creation
/// order.
#[derive(Debug)]
pub struct Rooms {
    rooms: BTreeMap<RoomId, Room>,
    next_id: u32,
}

impl Default for Rooms {
    fn default() -> Self {
        Self::new()
    }
}

impl Rooms {
    pub fn new() -> Self {
        Rooms {
            rooms: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Open a new room with `owner` seated in it.
    pub fn create(&mut self, owner: PlayerId) -> RoomId {
        let id = RoomId(self.next_id);
        self.next_id += 1;
        self.rooms.insert(
            id,
            Room {
                id,
                occupants: vec![owner],
            },
        );
        id
    }

    /// Seat `player` in an existing room. Filling the room consumes it.
    pub fn join(&mut self, room_id: RoomId, player: PlayerId) -> Result<JoinOutcome, Error> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(Error::UnknownRoom(room_id))?;
        if room.occupants.contains(&player) {
            return Err(Error::AlreadyInRoom(player));
        }
        if room.occupants.len() >= ROOM_CAPACITY {
            return Err(Error::RoomFull(room_id));
        }
        room.occupants.push(player);
        if room.occupants.len() == ROOM_CAPACITY {
            let players = [room.occupants[0], room.occupants[1]];
            self.rooms.remove(&room_id);
            return Ok(JoinOutcome::Ready(players));
        }
        Ok(JoinOutcome::Waiting)
    }

    /// Remove `player` from every room they sit in, destroying rooms that
    /// end up empty. Returns whether anything changed.
    pub fn remove_player(&mut self, player: PlayerId) -> bool {
        let mut changed = false;
        for room in self.rooms.values_mut() {
            let before = room.occupants.len();
            room.occupants.retain(|&p| p != player);
            changed |= room.occupants.len() != before;
        }
        self.rooms.retain(|_, room| !room.occupants.is_empty());
        changed
    }

    /// Listing of open rooms with occupant names resolved.
    pub fn summaries(&self, players: &Players) -> Vec<RoomSummary> {
        self.rooms
            .values()
            .map(|room| RoomSummary {
                id: room.id,
                occupants: room
                    .occupants
                    .iter()
                    .map(|&player| RoomOccupant {
                        player,
                        name: players.name_of(player).to_string(),
                    })
                    .collect(),
            })
            .collect()
    }
}
