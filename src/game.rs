//! Match state for one two-player game: placement, turns, attack resolution.

use rand::Rng;

use crate::board::{Board, Cell};
use crate::error::Error;
use crate::protocol::{AttackStatus, GameId, PlayerId};
use crate::ship::{Coord, Ship};

/// One side of a match. `ships` and `board` are kept in sync by
/// `place_ships`: the fleet is stored only after the board accepted it.
#[derive(Debug, Clone)]
struct PlayerSlot {
    player: PlayerId,
    ships: Vec<Ship>,
    placed: bool,
    board: Board,
}

impl PlayerSlot {
    fn new(player: PlayerId) -> Self {
        PlayerSlot {
            player,
            ships: Vec::new(),
            placed: false,
            board: Board::new(),
        }
    }
}

/// Result of a fleet submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Fleet accepted, opponent has not placed yet.
    Waiting,
    /// Both fleets are in and the match begins.
    Started { first_turn: PlayerId },
}

/// Result of a resolved attack, with everything a caller needs to notify
/// both participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub position: Coord,
    pub status: AttackStatus,
    /// Halo cells revealed as misses when the attack destroyed a ship.
    pub revealed: Vec<Coord>,
    pub winner: Option<PlayerId>,
    /// Holder of the turn after this attack resolved.
    pub turn: PlayerId,
}

/// A single match between two players.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    slots: [PlayerSlot; 2],
    turn: Option<PlayerId>,
    started: bool,
    finished: bool,
    winner: Option<PlayerId>,
}

impl Game {
    pub fn new(id: GameId, players: [PlayerId; 2]) -> Self {
        Game {
            id,
            slots: [PlayerSlot::new(players[0]), PlayerSlot::new(players[1])],
            turn: None,
            started: false,
            finished: false,
            winner: None,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.slots[0].player, self.slots[1].player]
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.slot_index(player).is_some()
    }

    /// Current turn holder, `None` until both fleets are placed.
    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// The fleet `player` submitted, if any.
    pub fn fleet_of(&self, player: PlayerId) -> Option<&[Ship]> {
        self.slot_index(player)
            .map(|idx| self.slots[idx].ships.as_slice())
    }

    /// The board owned by `player`.
    pub fn board_of(&self, player: PlayerId) -> Option<&Board> {
        self.slot_index(player).map(|idx| &self.slots[idx].board)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.slot_index(player)
            .map(|idx| self.slots[1 - idx].player)
    }

    fn slot_index(&self, player: PlayerId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.player == player)
    }

    /// Submit a fleet for `player`. Every ship must carry its class length and
    /// the whole fleet must fit legally; acceptance is all-or-nothing, so a
    /// rejected fleet can be resubmitted. When the second fleet lands the match
    /// starts and a random first turn is drawn.
    pub fn place_ships<R: Rng>(
        &mut self,
        player: PlayerId,
        ships: Vec<Ship>,
        rng: &mut R,
    ) -> Result<PlacementOutcome, Error> {
        let idx = self.slot_index(player).ok_or(Error::NotInGame(player))?;
        if self.finished {
            return Err(Error::GameOver);
        }
        if self.slots[idx].placed {
            return Err(Error::AlreadyPlaced);
        }
        for ship in &ships {
            let expected = ship.kind.length();
            if ship.length != expected {
                return Err(Error::BadShipLength {
                    kind: ship.kind,
                    expected,
                    got: ship.length,
                });
            }
        }
        self.slots[idx].board.place_fleet(&ships)?;
        self.slots[idx].ships = ships;
        self.slots[idx].placed = true;

        if self.slots.iter().all(|slot| slot.placed) {
            self.started = true;
            let first = if rng.random() {
                self.slots[0].player
            } else {
                self.slots[1].player
            };
            self.turn = Some(first);
            return Ok(PlacementOutcome::Started { first_turn: first });
        }
        Ok(PlacementOutcome::Waiting)
    }

    fn ensure_can_attack(&self, player: PlayerId) -> Result<(), Error> {
        if !self.has_player(player) {
            return Err(Error::NotInGame(player));
        }
        if self.finished {
            return Err(Error::GameOver);
        }
        if !self.started {
            return Err(Error::NotStarted);
        }
        if self.turn != Some(player) {
            return Err(Error::NotYourTurn(player));
        }
        Ok(())
    }

    /// Attack a chosen cell on the opponent's board.
    pub fn attack(&mut self, player: PlayerId, target: Coord) -> Result<AttackOutcome, Error> {
        self.ensure_can_attack(player)?;
        let def_idx = 1 - self.slot_index(player).ok_or(Error::NotInGame(player))?;
        match self.slots[def_idx].board.cell(target)? {
            Cell::Hit | Cell::Miss => return Err(Error::AlreadyAttacked(target)),
            Cell::Empty | Cell::Ship => {}
        }
        Ok(self.resolve_attack(player, def_idx, target))
    }

    /// Attack a uniformly random cell the attacker has not tried before.
    pub fn random_attack<R: Rng>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<AttackOutcome, Error> {
        self.ensure_can_attack(player)?;
        let def_idx = 1 - self.slot_index(player).ok_or(Error::NotInGame(player))?;
        let candidates = self.slots[def_idx].board.untried_cells();
        if candidates.is_empty() {
            return Err(Error::NoCellsLeft);
        }
        let target = candidates[rng.random_range(0..candidates.len())];
        Ok(self.resolve_attack(player, def_idx, target))
    }

    /// Resolve an already validated attack against the defender's board.
    fn resolve_attack(
        &mut self,
        attacker: PlayerId,
        def_idx: usize,
        target: Coord,
    ) -> AttackOutcome {
        let PlayerSlot { board, ships, .. } = &mut self.slots[def_idx];
        let mut revealed = Vec::new();
        let mut winner = None;

        // Callers validated the target, so reads and writes stay on the grid.
        let status = match board.cell(target).unwrap_or(Cell::Empty) {
            Cell::Ship => {
                let _ = board.set(target, Cell::Hit);
                let struck = ships.iter().find(|ship| ship.covers(target)).copied();
                match struck {
                    Some(ship) if board.is_destroyed(&ship) => {
                        revealed = board.mark_surrounding_misses(&ship);
                        if board.all_destroyed(ships) {
                            winner = Some(attacker);
                        }
                        AttackStatus::Killed
                    }
                    _ => AttackStatus::Hit,
                }
            }
            _ => {
                let _ = board.set(target, Cell::Miss);
                AttackStatus::Miss
            }
        };

        if status == AttackStatus::Miss {
            self.turn = Some(self.slots[def_idx].player);
        }
        if let Some(winner) = winner {
            self.finished = true;
            self.winner = Some(winner);
        }
        AttackOutcome {
            position: target,
            status,
            revealed,
            winner,
            turn: self.turn.unwrap_or(attacker),
        }
    }

    /// Forfeit the match for `leaver`. The opponent wins immediately, even if
    /// the match had not started. Finished games and non-members are ignored.
    pub fn forfeit(&mut self, leaver: PlayerId) -> Option<PlayerId> {
        if self.finished {
            return None;
        }
        let winner = self.opponent_of(leaver)?;
        self.finished = true;
        self.winner = Some(winner);
        Some(winner)
    }
}
