//! Request-level failures and their wire-visible classification.

use serde::{Deserialize, Serialize};

use crate::protocol::{GameId, PlayerId, RoomId};
use crate::ship::{Coord, Ship, ShipKind};

/// Taxonomy bucket reported to the client alongside the rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Identity,
    NotFound,
    Membership,
    Validation,
    Sequence,
    Exhaustion,
}

/// Everything a request can be rejected for. Rejections never tear down the
/// connection or the process; state stays exactly as it was before the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Name taken and the password does not match.
    #[error("name {0:?} is already registered with a different password")]
    InvalidCredentials(String),
    /// Registration name longer than `MAX_NAME_LEN` bytes.
    #[error("name of {0} bytes is too long")]
    NameTooLong(usize),
    /// The sending connection has no registered player.
    #[error("no player is registered on this connection")]
    UnknownPlayer,
    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),
    #[error("game {0} does not exist")]
    UnknownGame(GameId),
    #[error("player {0} is not part of this game")]
    NotInGame(PlayerId),
    /// A payload claimed an identity other than the one bound to the sender.
    #[error("request claims {claimed} but the connection is registered as {bound}")]
    IdentityMismatch { claimed: PlayerId, bound: PlayerId },
    #[error("player {0} already occupies this room")]
    AlreadyInRoom(PlayerId),
    #[error("room {0} is already full")]
    RoomFull(RoomId),
    #[error("player {0} is already in an unfinished game")]
    AlreadyInGame(PlayerId),
    #[error("ship of kind {kind:?} must have length {expected}, got {got}")]
    BadShipLength {
        kind: ShipKind,
        expected: u8,
        got: u8,
    },
    /// Out of bounds, or inside the one-cell buffer of another ship.
    #[error("illegal placement for the ship anchored at {}", .0.position)]
    IllegalPlacement(Ship),
    #[error("fleet is already placed")]
    AlreadyPlaced,
    #[error("game has not started yet")]
    NotStarted,
    #[error("game is already finished")]
    GameOver,
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("cell {0} was already attacked")]
    AlreadyAttacked(Coord),
    #[error("coordinate {0} is outside the board")]
    OutOfBounds(Coord),
    #[error("no cells left to attack")]
    NoCellsLeft,
    #[error("could not generate a legal random fleet")]
    FleetGenerationFailed,
}

impl Error {
    /// The taxonomy bucket this rejection is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidCredentials(_) => ErrorCode::Identity,
            Error::UnknownPlayer | Error::UnknownRoom(_) | Error::UnknownGame(_) => {
                ErrorCode::NotFound
            }
            Error::NotInGame(_) | Error::IdentityMismatch { .. } => ErrorCode::Membership,
            Error::NameTooLong(_)
            | Error::BadShipLength { .. }
            | Error::IllegalPlacement(_)
            | Error::OutOfBounds(_) => ErrorCode::Validation,
            Error::AlreadyInRoom(_)
            | Error::RoomFull(_)
            | Error::AlreadyInGame(_)
            | Error::AlreadyPlaced
            | Error::NotStarted
            | Error::GameOver
            | Error::NotYourTurn(_)
            | Error::AlreadyAttacked(_) => ErrorCode::Sequence,
            Error::NoCellsLeft | Error::FleetGenerationFailed => ErrorCode::Exhaustion,
        }
    }
}
