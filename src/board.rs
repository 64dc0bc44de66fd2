//! Per-player grid state and the placement/attack geometry over it.

use core::fmt;

use rand::Rng;

use crate::config::{BOARD_SIZE, PLACEMENT_ATTEMPTS};
use crate::error::Error;
use crate::ship::{Coord, Orientation, Ship, ShipKind};

/// State of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Hit,
    Miss,
}

/// One player's own N×N grid. Rows are indexed by `y`, columns by `x`.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, no ships placed.
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Cell state at `target`, or `OutOfBounds` off the grid.
    pub fn cell(&self, target: Coord) -> Result<Cell, Error> {
        let (x, y) = (target.x as usize, target.y as usize);
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(Error::OutOfBounds(target));
        }
        Ok(self.cells[y][x])
    }

    /// Overwrite the cell state at `target`.
    pub fn set(&mut self, target: Coord, cell: Cell) -> Result<(), Error> {
        let (x, y) = (target.x as usize, target.y as usize);
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(Error::OutOfBounds(target));
        }
        self.cells[y][x] = cell;
        Ok(())
    }

    fn is_ship(&self, x: usize, y: usize) -> bool {
        x < BOARD_SIZE && y < BOARD_SIZE && self.cells[y][x] == Cell::Ship
    }

    /// Placement legality: the whole footprint must lie on the grid, and no cell
    /// of the footprint or of its 8-neighborhood may already hold a ship. Distinct
    /// ships therefore always end up separated by at least one empty cell.
    pub fn can_place(&self, ship: &Ship) -> bool {
        if !ship.in_bounds() {
            return false;
        }
        for (x, y) in ship.cells() {
            for dx in -1i32..=1 {
                for dy in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && ny >= 0 && self.is_ship(nx as usize, ny as usize) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Place a whole fleet atomically. Ships are validated against a scratch
    /// copy that already contains the ships placed before them, so a fleet
    /// cannot violate the buffer against itself. On any failure the board is
    /// left untouched.
    pub fn place_fleet(&mut self, fleet: &[Ship]) -> Result<(), Error> {
        let mut scratch = self.clone();
        for ship in fleet {
            if !scratch.can_place(ship) {
                return Err(Error::IllegalPlacement(*ship));
            }
            scratch.put(ship);
        }
        *self = scratch;
        Ok(())
    }

    /// Write a footprint without validation; callers check `can_place` first.
    fn put(&mut self, ship: &Ship) {
        for (x, y) in ship.cells() {
            self.cells[y][x] = Cell::Ship;
        }
    }

    /// True when every footprint cell of `ship` has been hit.
    pub fn is_destroyed(&self, ship: &Ship) -> bool {
        ship.cells().all(|(x, y)| self.cells[y][x] == Cell::Hit)
    }

    /// True when every ship of `fleet` is destroyed.
    pub fn all_destroyed(&self, fleet: &[Ship]) -> bool {
        fleet.iter().all(|ship| self.is_destroyed(ship))
    }

    /// Reveal the halo of a destroyed ship: every on-grid cell in the footprint's
    /// inflated bounding box that is not `Hit` becomes `Miss`. Returns the marked
    /// cells in scan order (x outer, y inner), which is also the order they are
    /// reported to the players.
    pub fn mark_surrounding_misses(&mut self, ship: &Ship) -> Vec<Coord> {
        let (ax, ay) = (ship.position.x as i32, ship.position.y as i32);
        let (w, h) = match ship.orientation {
            Orientation::Horizontal => (ship.length as i32, 1),
            Orientation::Vertical => (1, ship.length as i32),
        };
        let mut revealed = Vec::new();
        for x in ax - 1..=ax + w {
            for y in ay - 1..=ay + h {
                if x < 0 || y < 0 || x >= BOARD_SIZE as i32 || y >= BOARD_SIZE as i32 {
                    continue;
                }
                if self.cells[y as usize][x as usize] != Cell::Hit {
                    self.cells[y as usize][x as usize] = Cell::Miss;
                    revealed.push(Coord::new(x as u8, y as u8));
                }
            }
        }
        revealed
    }

    /// Cells that have not been attacked yet (neither `Hit` nor `Miss`).
    pub fn untried_cells(&self) -> Vec<Coord> {
        let mut cells = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                match self.cells[y][x] {
                    Cell::Hit | Cell::Miss => {}
                    Cell::Empty | Cell::Ship => cells.push(Coord::new(x as u8, y as u8)),
                }
            }
        }
        cells
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for row in &self.cells {
            for cell in row {
                let glyph = match cell {
                    Cell::Empty => '.',
                    Cell::Ship => 'S',
                    Cell::Hit => 'x',
                    Cell::Miss => 'o',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Generate a legal random fleet, one ship of each class, biggest first.
/// Bounded rejection sampling against a scratch board; fails only if a ship
/// cannot be placed within `PLACEMENT_ATTEMPTS` tries.
pub fn random_fleet<R: Rng>(rng: &mut R) -> Result<Vec<Ship>, Error> {
    let mut scratch = Board::new();
    let mut fleet = Vec::with_capacity(ShipKind::ALL.len());
    for kind in ShipKind::ALL.iter().rev() {
        let mut placed = false;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let len = kind.length() as usize;
            let (max_x, max_y) = match orientation {
                Orientation::Horizontal => (BOARD_SIZE - len, BOARD_SIZE - 1),
                Orientation::Vertical => (BOARD_SIZE - 1, BOARD_SIZE - len),
            };
            let ship = Ship::new(
                rng.random_range(0..=max_x) as u8,
                rng.random_range(0..=max_y) as u8,
                orientation,
                *kind,
            );
            if scratch.can_place(&ship) {
                scratch.put(&ship);
                fleet.push(ship);
                placed = true;
                break;
            }
        }
        if !placed {
            return Err(Error::FleetGenerationFailed);
        }
    }
    Ok(fleet)
}
