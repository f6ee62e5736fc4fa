//! Grid coordinates.

use serde::{Deserialize, Serialize};

/// Width and height of the battleship grid.
pub const GRID_SIZE: usize = 10;

/// A cell on the grid, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index, 0 at the top.
    pub row: usize,
    /// Column index, 0 at the left.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate. Off-grid values are allowed and rejected later.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether the cell lies inside the grid.
    pub fn is_on_grid(&self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// Whether two cells coincide or touch, diagonals included.
    pub fn touches(&self, other: &Coord) -> bool {
        self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }

    /// Cell `steps` further along `orientation`, if it can be represented.
    pub fn offset(&self, orientation: Orientation, steps: usize) -> Option<Coord> {
        match orientation {
            Orientation::Horizontal => self.col.checked_add(steps).map(|col| Coord::new(self.row, col)),
            Orientation::Vertical => self.row.checked_add(steps).map(|row| Coord::new(row, self.col)),
        }
    }

    /// Player-facing label: row letter and one-based column, e.g. `A1`.
    pub fn label(&self) -> String {
        match u8::try_from(self.row).ok().filter(|r| *r < 26) {
            Some(r) => format!("{}{}", char::from(b'A' + r), self.col + 1),
            None => format!("R{}C{}", self.row, self.col + 1),
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction a ship extends from its origin cell.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Orientation {
    /// Extends to the right.
    Horizontal,
    /// Extends downward.
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_row_letter_and_one_based_column() {
        assert_eq!(Coord::new(0, 0).label(), "A1");
        assert_eq!(Coord::new(9, 9).label(), "J10");
        assert_eq!(Coord::new(2, 4).to_string(), "C5");
    }

    #[test]
    fn touching_includes_diagonals_and_self() {
        let c = Coord::new(4, 4);
        assert!(c.touches(&Coord::new(4, 4)));
        assert!(c.touches(&Coord::new(5, 5)));
        assert!(c.touches(&Coord::new(3, 5)));
        assert!(!c.touches(&Coord::new(6, 4)));
    }

    #[test]
    fn grid_bounds() {
        assert!(Coord::new(9, 0).is_on_grid());
        assert!(!Coord::new(10, 0).is_on_grid());
        assert!(!Coord::new(0, 10).is_on_grid());
    }
}
