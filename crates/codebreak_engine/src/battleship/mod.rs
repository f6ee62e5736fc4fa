//! Battleship sub-model: a 10×10 grid, five ships and the shots fired at them.

mod coord;
mod placement;
mod ship;
mod shots;

pub use coord::{Coord, GRID_SIZE, Orientation};
pub use placement::{
    Fleet, MAX_ATTEMPTS_PER_SHIP, PlacementError, place_ship, ship_cells, validate_placement,
};
pub use ship::{Ship, ShipClass};
pub use shots::{Shot, ShotResult, ShotStats, check_fleet_defeated, resolve_shot};
