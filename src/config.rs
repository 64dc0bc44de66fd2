//! Compile-time parameters of the coordinator.

/// Side length of every player grid.
pub const BOARD_SIZE: usize = 10;

/// Occupants a room needs before it is promoted into a game.
pub const ROOM_CAPACITY: usize = 2;

/// Default listen address of the server binary.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Upper bound on a single wire frame; anything larger closes the connection.
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

/// Longest registration name accepted, in bytes. Bounded so that no single
/// name can push an event it appears in past `MAX_FRAME_LEN`.
pub const MAX_NAME_LEN: usize = 32;

/// Attempts per ship before random fleet generation gives up.
pub const PLACEMENT_ATTEMPTS: usize = 100;
