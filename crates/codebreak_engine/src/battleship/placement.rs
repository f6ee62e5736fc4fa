//! Ship placement rules and fleet assembly.
//!
//! Ships must lie fully on the grid and may not overlap or touch another
//! ship, diagonals included.

use super::{Coord, GRID_SIZE, Orientation, Ship, ShipClass};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Random placement attempts per ship before the whole fleet is redrawn.
pub const MAX_ATTEMPTS_PER_SHIP: usize = 100;

/// Error raised when a ship or fleet cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PlacementError {
    /// Part of the ship would leave the grid.
    #[display("{} at {} ({}) does not fit on the grid", class, origin, orientation)]
    OutOfBounds {
        /// Ship being placed.
        class: ShipClass,
        /// Requested origin cell.
        origin: Coord,
        /// Requested orientation.
        orientation: Orientation,
    },

    /// The ship would overlap or touch an already placed ship.
    #[display("{} would touch the {}", class, neighbor)]
    TouchesNeighbor {
        /// Ship being placed.
        class: ShipClass,
        /// Ship it collides with.
        neighbor: ShipClass,
    },

    /// The ship is already on the grid and must be cleared first.
    #[display("{} is already placed", _0)]
    AlreadyPlaced(ShipClass),

    /// The ship is not on the grid.
    #[display("{} is not placed", _0)]
    NotPlaced(ShipClass),

    /// Not every ship of the fleet has been placed.
    #[display("Fleet incomplete: {} of {} ships placed", placed, required)]
    FleetIncomplete {
        /// Ships placed so far.
        placed: usize,
        /// Ships a fleet needs.
        required: usize,
    },

    /// A fleet listed the same class twice.
    #[display("Fleet contains more than one {}", _0)]
    DuplicateShip(ShipClass),

    /// A submitted ship's cells are not a straight run of its length, or it
    /// arrived already damaged.
    #[display("{} has an invalid shape", _0)]
    MalformedShip(ShipClass),
}

impl std::error::Error for PlacementError {}

/// Cells a ship of `length` covers from `origin`, or `None` if any leaves the grid.
pub fn ship_cells(length: usize, origin: Coord, orientation: Orientation) -> Option<Vec<Coord>> {
    (0..length)
        .map(|i| origin.offset(orientation, i).filter(Coord::is_on_grid))
        .collect()
}

/// Checks a candidate placement and returns its cells.
fn check_placement(
    class: ShipClass,
    origin: Coord,
    orientation: Orientation,
    placed: &[Ship],
) -> Result<Vec<Coord>, PlacementError> {
    let cells = ship_cells(class.length(), origin, orientation).ok_or(
        PlacementError::OutOfBounds {
            class,
            origin,
            orientation,
        },
    )?;
    check_clearance(class, &cells, placed)?;
    Ok(cells)
}

/// Ensures `cells` keep a one-cell gap from every placed ship.
fn check_clearance(class: ShipClass, cells: &[Coord], placed: &[Ship]) -> Result<(), PlacementError> {
    let neighbor = placed
        .iter()
        .filter(|ship| ship.is_placed())
        .find(|ship| {
            ship.cells()
                .iter()
                .any(|taken| cells.iter().any(|cell| cell.touches(taken)))
        });
    match neighbor {
        Some(ship) => Err(PlacementError::TouchesNeighbor {
            class,
            neighbor: ship.class(),
        }),
        None => Ok(()),
    }
}

/// Whether a ship of `length` fits at `origin` without touching `placed`.
#[instrument(skip(placed), fields(placed = placed.len()))]
pub fn validate_placement(
    length: usize,
    origin: Coord,
    orientation: Orientation,
    placed: &[Ship],
) -> bool {
    ship_cells(length, origin, orientation).is_some_and(|cells| {
        placed
            .iter()
            .filter(|ship| ship.is_placed())
            .all(|ship| {
                ship.cells()
                    .iter()
                    .all(|taken| cells.iter().all(|cell| !cell.touches(taken)))
            })
    })
}

/// Places `ship` at `origin`, or returns `None` if it is already placed or
/// the placement is illegal. `ship` itself is never modified.
#[instrument(skip(ship, placed), fields(class = %ship.class()))]
pub fn place_ship(
    ship: &Ship,
    origin: Coord,
    orientation: Orientation,
    placed: &[Ship],
) -> Option<Ship> {
    if ship.is_placed() {
        return None;
    }
    check_placement(ship.class(), origin, orientation, placed)
        .ok()
        .map(|cells| Ship::placed(ship.class(), cells))
}

/// One player's five ships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    /// A fleet with every class present and nothing placed.
    pub fn new() -> Self {
        Self {
            ships: ShipClass::iter().map(Ship::unplaced).collect(),
        }
    }

    /// Ships in class order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// The ship of the given class.
    pub fn ship(&self, class: ShipClass) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.class() == class)
    }

    /// Places the ship of `class` at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError`] if the ship is already placed, leaves the
    /// grid or touches another ship. The fleet is unchanged on error.
    #[instrument(skip(self))]
    pub fn place(
        &mut self,
        class: ShipClass,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<(), PlacementError> {
        let index = self.index_of(class)?;
        if self.ships[index].is_placed() {
            warn!(%class, "Ship already placed");
            return Err(PlacementError::AlreadyPlaced(class));
        }
        let cells = check_placement(class, origin, orientation, &self.ships)?;
        debug!(%class, %origin, "Ship placed");
        self.ships[index] = Ship::placed(class, cells);
        Ok(())
    }

    /// Takes the ship of `class` back off the grid.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotPlaced`] if it is not on the grid, or
    /// [`PlacementError::MalformedShip`] if it has already been hit.
    #[instrument(skip(self))]
    pub fn clear(&mut self, class: ShipClass) -> Result<(), PlacementError> {
        let index = self.index_of(class)?;
        let ship = &mut self.ships[index];
        if !ship.is_placed() {
            return Err(PlacementError::NotPlaced(class));
        }
        if ship.hits() > 0 {
            return Err(PlacementError::MalformedShip(class));
        }
        ship.clear();
        Ok(())
    }

    /// Whether every ship sits on the grid.
    pub fn all_ships_placed(&self) -> bool {
        self.ships.len() == ShipClass::iter().count() && self.ships.iter().all(Ship::is_placed)
    }

    /// Number of ships on the grid.
    pub fn placed_count(&self) -> usize {
        self.ships.iter().filter(|ship| ship.is_placed()).count()
    }

    /// Number of sunk ships.
    pub fn sunk_count(&self) -> usize {
        self.ships.iter().filter(|ship| ship.is_sunk()).count()
    }

    /// Whether every ship is sunk.
    pub fn is_defeated(&self) -> bool {
        super::check_fleet_defeated(&self.ships)
    }

    /// Draws a legal random fleet.
    ///
    /// Each ship gets [`MAX_ATTEMPTS_PER_SHIP`] random tries. If any ship runs
    /// out, the partial layout is thrown away and the fleet starts over.
    #[instrument(skip(rng))]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut restarts = 0usize;
        loop {
            if let Some(fleet) = Self::try_random(rng) {
                debug!(restarts, "Random fleet generated");
                return fleet;
            }
            restarts += 1;
        }
    }

    fn try_random<R: Rng + ?Sized>(rng: &mut R) -> Option<Self> {
        let mut fleet = Self::new();
        for class in ShipClass::iter() {
            let placed = (0..MAX_ATTEMPTS_PER_SHIP).any(|_| {
                let origin = Coord::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE));
                let orientation = if rng.random_bool(0.5) {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                };
                fleet.place(class, origin, orientation).is_ok()
            });
            if !placed {
                return None;
            }
        }
        Some(fleet)
    }

    /// Validates a fleet submitted as a list of ships.
    ///
    /// Every class must appear exactly once, placed and undamaged, on a
    /// straight run of cells of its length, clear of every other ship.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlacementError`] found.
    #[instrument(skip(ships), fields(ships = ships.len()))]
    pub fn validate(ships: Vec<Ship>) -> Result<Self, PlacementError> {
        let mut seen = HashSet::new();
        for ship in &ships {
            if !seen.insert(ship.class()) {
                return Err(PlacementError::DuplicateShip(ship.class()));
            }
        }
        let required = ShipClass::iter().count();
        let placed = ships.iter().filter(|ship| ship.is_placed()).count();
        if ships.len() != required || placed != required {
            return Err(PlacementError::FleetIncomplete { placed, required });
        }

        let mut fleet = Self { ships: Vec::with_capacity(required) };
        for class in ShipClass::iter() {
            let Some(ship) = ships.iter().find(|ship| ship.class() == class) else {
                return Err(PlacementError::FleetIncomplete { placed, required });
            };
            if ship.hits() > 0 || !is_straight_run(ship) {
                return Err(PlacementError::MalformedShip(class));
            }
            let first = ship.cells()[0];
            if !ship.cells().iter().all(Coord::is_on_grid) {
                let orientation = run_orientation(ship.cells());
                return Err(PlacementError::OutOfBounds {
                    class,
                    origin: first,
                    orientation,
                });
            }
            check_clearance(class, ship.cells(), &fleet.ships)?;
            fleet.ships.push(Ship::placed(class, ship.cells().to_vec()));
        }
        Ok(fleet)
    }

    fn index_of(&self, class: ShipClass) -> Result<usize, PlacementError> {
        self.ships
            .iter()
            .position(|ship| ship.class() == class)
            .ok_or(PlacementError::FleetIncomplete {
                placed: self.placed_count(),
                required: ShipClass::iter().count(),
            })
    }

    pub(crate) fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }
}

/// Orientation implied by a run of cells; single cells count as horizontal.
fn run_orientation(cells: &[Coord]) -> Orientation {
    match cells {
        [a, b, ..] if a.col == b.col => Orientation::Vertical,
        _ => Orientation::Horizontal,
    }
}

/// Whether a ship's cells are exactly its length, contiguous and in one line.
fn is_straight_run(ship: &Ship) -> bool {
    let cells = ship.cells();
    if cells.len() != ship.length() {
        return false;
    }
    let mut sorted = cells.to_vec();
    sorted.sort();
    let origin = sorted[0];
    let orientation = run_orientation(&sorted);
    (0..sorted.len()).all(|i| origin.offset(orientation, i) == Some(sorted[i]))
}
