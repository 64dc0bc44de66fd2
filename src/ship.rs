//! Ships and the grid coordinates they occupy.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BOARD_SIZE;

/// A single cell address; (0, 0) is the top-left corner of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub fn new(x: u8, y: u8) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Ship classes, each tied to a canonical footprint length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipKind {
    Small,
    Medium,
    Large,
    Huge,
}

impl ShipKind {
    pub const ALL: [ShipKind; 4] = [
        ShipKind::Small,
        ShipKind::Medium,
        ShipKind::Large,
        ShipKind::Huge,
    ];

    /// Canonical footprint length of this class.
    pub const fn length(self) -> u8 {
        match self {
            ShipKind::Small => 1,
            ShipKind::Medium => 2,
            ShipKind::Large => 3,
            ShipKind::Huge => 4,
        }
    }
}

/// A ship as submitted by a client: anchor cell, orientation, declared kind and
/// length. The declared length must match the kind's canonical length; the game
/// rejects the fleet otherwise, so an accepted ship is immutable and consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub position: Coord,
    pub orientation: Orientation,
    pub length: u8,
    pub kind: ShipKind,
}

impl Ship {
    /// Ship with the canonical length for `kind`.
    pub fn new(x: u8, y: u8, orientation: Orientation, kind: ShipKind) -> Self {
        Ship {
            position: Coord::new(x, y),
            orientation,
            length: kind.length(),
            kind,
        }
    }

    /// Cells of the footprint, anchor first. Produced in usize space so an
    /// anchor near the numeric limit of the wire type cannot wrap.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x, y) = (self.position.x as usize, self.position.y as usize);
        let orientation = self.orientation;
        (0..self.length as usize).map(move |i| match orientation {
            Orientation::Horizontal => (x + i, y),
            Orientation::Vertical => (x, y + i),
        })
    }

    /// True when the footprint covers `target`.
    pub fn covers(&self, target: Coord) -> bool {
        let (tx, ty) = (target.x as usize, target.y as usize);
        self.cells().any(|(x, y)| x == tx && y == ty)
    }

    /// True when the whole footprint lies on the grid.
    pub fn in_bounds(&self) -> bool {
        self.cells().all(|(x, y)| x < BOARD_SIZE && y < BOARD_SIZE)
    }
}
