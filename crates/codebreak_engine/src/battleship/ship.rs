//! Ship classes and per-ship damage.

use super::Coord;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// The five ship classes every fleet contains exactly once.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShipClass {
    /// Five cells.
    Carrier,
    /// Four cells.
    Battleship,
    /// Three cells.
    Cruiser,
    /// Three cells.
    Destroyer,
    /// Two cells.
    Submarine,
}

impl ShipClass {
    /// Number of cells a ship of this class occupies.
    pub fn length(self) -> usize {
        match self {
            Self::Carrier => 5,
            Self::Battleship => 4,
            Self::Cruiser | Self::Destroyer => 3,
            Self::Submarine => 2,
        }
    }

    /// Total cells of a complete fleet.
    pub fn fleet_cells() -> usize {
        Self::iter().map(Self::length).sum()
    }
}

/// One ship: its class, the cells it covers once placed and its damage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    class: ShipClass,
    #[serde(default)]
    cells: Vec<Coord>,
    #[serde(default)]
    hits: usize,
    #[serde(default)]
    placed: bool,
}

impl Ship {
    /// An unplaced, undamaged ship.
    pub fn unplaced(class: ShipClass) -> Self {
        Self {
            class,
            cells: Vec::new(),
            hits: 0,
            placed: false,
        }
    }

    /// A ship placed on the given cells. Legality is checked by the fleet.
    pub fn placed(class: ShipClass, cells: Vec<Coord>) -> Self {
        Self {
            class,
            cells,
            hits: 0,
            placed: true,
        }
    }

    /// Ship class.
    pub fn class(&self) -> ShipClass {
        self.class
    }

    /// Length of the ship's class.
    pub fn length(&self) -> usize {
        self.class.length()
    }

    /// Occupied cells, in order from the origin.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Number of hits taken.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Whether the ship sits on the grid.
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Whether `coord` is one of the ship's cells.
    pub fn occupies(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Whether every cell has been hit.
    pub fn is_sunk(&self) -> bool {
        self.placed && self.hits >= self.length()
    }

    /// Records a hit and reports whether the ship is now sunk.
    pub(crate) fn register_hit(&mut self) -> bool {
        self.hits += 1;
        self.is_sunk()
    }

    /// Removes the ship from the grid.
    pub(crate) fn clear(&mut self) {
        self.cells.clear();
        self.placed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_lengths() {
        let lengths: Vec<usize> = ShipClass::iter().map(ShipClass::length).collect();
        assert_eq!(lengths, vec![5, 4, 3, 3, 2]);
        assert_eq!(ShipClass::fleet_cells(), 17);
    }

    #[test]
    fn ship_sinks_after_length_hits() {
        let mut ship = Ship::placed(
            ShipClass::Submarine,
            vec![Coord::new(0, 0), Coord::new(0, 1)],
        );
        assert!(!ship.register_hit());
        assert!(ship.register_hit());
        assert!(ship.is_sunk());
    }
}
