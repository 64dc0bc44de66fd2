//! Request dispatch over the whole server state: accounts, rooms and games.

use std::collections::HashMap;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::Error;
use crate::game::{Game, PlacementOutcome};
use crate::protocol::{AttackStatus, ConnectionId, Event, GameId, PlayerId, Request, RoomId};
use crate::room::{JoinOutcome, Rooms};
use crate::session::{Connections, Players};
use crate::ship::{Coord, Ship};

/// Sink for outgoing events. The TCP server backs this with per-connection
/// channels; tests and the simulator back it with plain vectors.
pub trait Outbox {
    /// Deliver an event to one connection.
    fn send(&mut self, to: ConnectionId, event: Event);
    /// Deliver an event to every open connection.
    fn broadcast(&mut self, event: Event);
}

/// The authoritative coordinator. Owns all state and resolves every request
/// sequentially; callers serialize access to it.
pub struct Router {
    players: Players,
    connections: Connections,
    rooms: Rooms,
    games: HashMap<GameId, Game>,
    next_game_id: u32,
    rng: SmallRng,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(SmallRng::from_rng(&mut seed_rng))
    }

    /// Seeded variant for reproducible runs.
    pub fn with_rng(rng: SmallRng) -> Self {
        Router {
            players: Players::new(),
            connections: Connections::new(),
            rooms: Rooms::new(),
            games: HashMap::new(),
            next_game_id: 1,
            rng,
        }
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// Greet a fresh connection with the current room list and leaderboard.
    pub fn connection_opened(&self, conn: ConnectionId, out: &mut dyn Outbox) {
        out.send(conn, Event::RoomList(self.rooms.summaries(&self.players)));
        out.send(conn, Event::Leaderboard(self.players.leaderboard()));
    }

    /// Resolve one request. Failures never tear state down; the sender gets a
    /// `Rejected` event carrying the error class and message.
    pub fn handle(&mut self, conn: ConnectionId, request: Request, out: &mut dyn Outbox) {
        let result = match request {
            Request::Register { name, password } => self.register(conn, &name, &password, out),
            Request::CreateRoom => self.create_room(conn, out),
            Request::JoinRoom { room } => self.join_room(conn, room, out),
            Request::PlaceShips {
                game,
                ships,
                player,
            } => self.place_ships(conn, game, ships, player, out),
            Request::Attack {
                game,
                target,
                player,
            } => self.attack(conn, game, Some(target), player, out),
            Request::RandomAttack { game, player } => self.attack(conn, game, None, player, out),
        };
        if let Err(err) = result {
            warn!("{conn}: request rejected: {err}");
            out.send(
                conn,
                Event::Rejected {
                    code: err.code(),
                    message: err.to_string(),
                },
            );
        }
    }

    /// Tear down a closed connection: free its rooms and forfeit its games.
    pub fn connection_closed(&mut self, conn: ConnectionId, out: &mut dyn Outbox) {
        let player = match self.connections.unbind(conn) {
            Some(player) => player,
            None => return,
        };
        info!("{conn}: {player} left");
        if self.rooms.remove_player(player) {
            self.broadcast_rooms(out);
        }
        let forfeits: Vec<(PlayerId, [PlayerId; 2])> = self
            .games
            .values_mut()
            .filter_map(|game| game.forfeit(player).map(|winner| (winner, game.players())))
            .collect();
        for (winner, participants) in forfeits {
            info!("{player} forfeited, {winner} wins");
            self.players.record_win(winner);
            out.broadcast(Event::Leaderboard(self.players.leaderboard()));
            for p in participants {
                self.send_to_player(p, Event::GameFinished { winner }, out);
            }
        }
    }

    fn register(
        &mut self,
        conn: ConnectionId,
        name: &str,
        password: &str,
        out: &mut dyn Outbox,
    ) -> Result<(), Error> {
        let player = self.players.register(name, password)?;
        self.connections.bind(conn, player);
        info!("{conn}: registered as {name:?} ({player})");
        out.send(
            conn,
            Event::Registered {
                name: name.to_string(),
                player,
            },
        );
        out.broadcast(Event::Leaderboard(self.players.leaderboard()));
        Ok(())
    }

    fn create_room(&mut self, conn: ConnectionId, out: &mut dyn Outbox) -> Result<(), Error> {
        let player = self.require_player(conn)?;
        self.ensure_free_for_matchmaking(player)?;
        let room = self.rooms.create(player);
        info!("{player} opened {room}");
        self.broadcast_rooms(out);
        Ok(())
    }

    fn join_room(
        &mut self,
        conn: ConnectionId,
        room_id: RoomId,
        out: &mut dyn Outbox,
    ) -> Result<(), Error> {
        let player = self.require_player(conn)?;
        self.ensure_free_for_matchmaking(player)?;
        match self.rooms.join(room_id, player)? {
            JoinOutcome::Waiting => self.broadcast_rooms(out),
            JoinOutcome::Ready(players) => {
                let game = self.create_game(players);
                info!(
                    "{room_id} filled, {game} starts between {} and {}",
                    players[0], players[1]
                );
                // Entering a match abandons any other room the pair sat in.
                for p in players {
                    self.rooms.remove_player(p);
                }
                self.broadcast_rooms(out);
                for p in players {
                    self.send_to_player(p, Event::GameCreated { game, player: p }, out);
                }
            }
        }
        Ok(())
    }

    fn create_game(&mut self, players: [PlayerId; 2]) -> GameId {
        let id = GameId(self.next_game_id);
        self.next_game_id += 1;
        self.games.insert(id, Game::new(id, players));
        id
    }

    fn place_ships(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
        ships: Vec<Ship>,
        claimed: PlayerId,
        out: &mut dyn Outbox,
    ) -> Result<(), Error> {
        let player = self.require_claim(conn, claimed)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(Error::UnknownGame(game_id))?;
        match game.place_ships(player, ships, &mut self.rng)? {
            PlacementOutcome::Waiting => {
                info!("{game_id}: {player} placed ships, waiting for opponent");
            }
            PlacementOutcome::Started { first_turn } => {
                let participants = game.players();
                let fleets: Vec<(PlayerId, Vec<Ship>)> = participants
                    .iter()
                    .map(|&p| (p, game.fleet_of(p).unwrap_or_default().to_vec()))
                    .collect();
                info!("{game_id}: both fleets placed, {first_turn} moves first");
                for (p, fleet) in fleets {
                    self.send_to_player(
                        p,
                        Event::GameStarted {
                            ships: fleet,
                            turn: first_turn,
                        },
                        out,
                    );
                }
                for p in participants {
                    self.send_to_player(p, Event::TurnChanged { player: first_turn }, out);
                }
            }
        }
        Ok(())
    }

    fn attack(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
        target: Option<Coord>,
        claimed: PlayerId,
        out: &mut dyn Outbox,
    ) -> Result<(), Error> {
        let player = self.require_claim(conn, claimed)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(Error::UnknownGame(game_id))?;
        let outcome = match target {
            Some(target) => game.attack(player, target)?,
            None => game.random_attack(player, &mut self.rng)?,
        };
        let participants = game.players();

        for cell in &outcome.revealed {
            for p in participants {
                self.send_to_player(
                    p,
                    Event::AttackResult {
                        position: *cell,
                        player,
                        status: AttackStatus::Miss,
                    },
                    out,
                );
            }
        }
        if let Some(winner) = outcome.winner {
            info!("{game_id}: {winner} wins");
            self.players.record_win(winner);
            out.broadcast(Event::Leaderboard(self.players.leaderboard()));
            for p in participants {
                self.send_to_player(p, Event::GameFinished { winner }, out);
            }
        }
        for p in participants {
            self.send_to_player(
                p,
                Event::AttackResult {
                    position: outcome.position,
                    player,
                    status: outcome.status,
                },
                out,
            );
        }
        if outcome.status == AttackStatus::Miss {
            for p in participants {
                self.send_to_player(
                    p,
                    Event::TurnChanged {
                        player: outcome.turn,
                    },
                    out,
                );
            }
        }
        Ok(())
    }

    fn require_player(&self, conn: ConnectionId) -> Result<PlayerId, Error> {
        self.connections.player_of(conn).ok_or(Error::UnknownPlayer)
    }

    /// Requests that name a player id must come from the connection that
    /// identity is bound to.
    fn require_claim(&self, conn: ConnectionId, claimed: PlayerId) -> Result<PlayerId, Error> {
        let bound = self.require_player(conn)?;
        if bound != claimed {
            return Err(Error::IdentityMismatch { claimed, bound });
        }
        Ok(bound)
    }

    /// A player may sit in rooms or start new ones only while not part of an
    /// unfinished game.
    fn ensure_free_for_matchmaking(&self, player: PlayerId) -> Result<(), Error> {
        if self
            .games
            .values()
            .any(|game| !game.finished() && game.has_player(player))
        {
            return Err(Error::AlreadyInGame(player));
        }
        Ok(())
    }

    fn broadcast_rooms(&self, out: &mut dyn Outbox) {
        out.broadcast(Event::RoomList(self.rooms.summaries(&self.players)));
    }

    /// Send to the connection currently bound to `player`, dropping the event
    /// silently when the player is offline.
    fn send_to_player(&self, player: PlayerId, event: Event, out: &mut dyn Outbox) {
        if let Some(conn) = self.connections.conn_of(player) {
            out.send(conn, event);
        }
    }
}
