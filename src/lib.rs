//! Authoritative coordinator for two-player battleship matches.
//!
//! The [`Router`] owns every account, room and game and resolves requests
//! one at a time; [`Server`] exposes it over length-prefixed binary TCP.
//! Boards are private to their owner: opponents only ever learn about cells
//! through attack results.

mod board;
mod config;
mod error;
mod game;
mod logging;
mod protocol;
mod room;
mod router;
mod server;
mod session;
mod ship;

pub use board::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use logging::init_logging;
pub use protocol::*;
pub use room::*;
pub use router::*;
pub use server::*;
pub use session::*;
pub use ship::*;
