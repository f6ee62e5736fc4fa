//! Shot resolution and fleet defeat.

use super::{Coord, Fleet, Ship, ShipClass};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// What a shot struck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShotResult {
    /// Struck a ship that is still afloat.
    Hit,
    /// Struck open water.
    Miss,
    /// Struck the last intact cell of a ship.
    Sunk,
}

/// A shot fired at the opponent's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shot {
    /// Target cell.
    pub coord: Coord,
    /// Outcome.
    pub result: ShotResult,
    /// Class of the ship struck, if any.
    pub ship: Option<ShipClass>,
}

impl Shot {
    /// Whether the shot struck a ship. Hits keep the turn.
    pub fn is_hit(&self) -> bool {
        matches!(self.result, ShotResult::Hit | ShotResult::Sunk)
    }
}

/// Resolves a shot at `coord` against `target`.
///
/// Returns `None`, changing nothing, if the shooter already fired at that
/// cell or the cell is off the grid. Otherwise a struck ship takes one hit.
#[instrument(skip(target, prior), fields(prior = prior.len()))]
pub fn resolve_shot(coord: Coord, target: &mut Fleet, prior: &[Shot]) -> Option<Shot> {
    if !coord.is_on_grid() || prior.iter().any(|shot| shot.coord == coord) {
        debug!("Shot rejected");
        return None;
    }

    let shot = match target
        .ships_mut()
        .iter_mut()
        .find(|ship| ship.is_placed() && ship.occupies(coord))
    {
        Some(ship) => {
            let result = if ship.register_hit() {
                ShotResult::Sunk
            } else {
                ShotResult::Hit
            };
            Shot {
                coord,
                result,
                ship: Some(ship.class()),
            }
        }
        None => Shot {
            coord,
            result: ShotResult::Miss,
            ship: None,
        },
    };
    debug!(result = %shot.result, "Shot resolved");
    Some(shot)
}

/// Whether every ship has taken at least as many hits as it has cells.
pub fn check_fleet_defeated(ships: &[Ship]) -> bool {
    ships.iter().all(|ship| ship.hits() >= ship.length())
}

/// Accuracy summary of one player's shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotStats {
    /// Shots fired.
    pub total: usize,
    /// Shots that struck a ship, sinking shots included.
    pub hits: usize,
    /// Shots into open water.
    pub misses: usize,
    /// Ships sunk.
    pub sunk: usize,
    /// Hits as a whole-number percentage of shots, 0 with no shots.
    pub accuracy: u32,
}

impl ShotStats {
    /// Tallies a shot history.
    pub fn from_shots(shots: &[Shot]) -> Self {
        let total = shots.len();
        let hits = shots.iter().filter(|shot| shot.is_hit()).count();
        let sunk = shots
            .iter()
            .filter(|shot| shot.result == ShotResult::Sunk)
            .count();
        let accuracy = if total == 0 {
            0
        } else {
            u32::try_from((hits * 100 + total / 2) / total).unwrap_or(100)
        };
        Self {
            total,
            hits,
            misses: total - hits,
            sunk,
            accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battleship::Orientation;

    fn cruiser_fleet() -> Fleet {
        let mut fleet = Fleet::new();
        fleet
            .place(ShipClass::Cruiser, Coord::new(2, 2), Orientation::Horizontal)
            .expect("fits");
        fleet
    }

    #[test]
    fn miss_leaves_ships_untouched() {
        let mut fleet = cruiser_fleet();
        let before = fleet.clone();
        let shot = resolve_shot(Coord::new(7, 7), &mut fleet, &[]).expect("resolves");
        assert_eq!(shot.result, ShotResult::Miss);
        assert_eq!(shot.ship, None);
        assert_eq!(fleet, before);
    }

    #[test]
    fn last_cell_sinks_the_ship() {
        let mut fleet = cruiser_fleet();
        let mut shots = Vec::new();
        for col in 2..4 {
            let shot = resolve_shot(Coord::new(2, col), &mut fleet, &shots).expect("resolves");
            assert_eq!(shot.result, ShotResult::Hit);
            shots.push(shot);
        }
        let last = resolve_shot(Coord::new(2, 4), &mut fleet, &shots).expect("resolves");
        assert_eq!(last.result, ShotResult::Sunk);
        assert_eq!(last.ship, Some(ShipClass::Cruiser));
        assert_eq!(fleet.sunk_count(), 1);
    }

    #[test]
    fn repeated_coordinate_is_rejected_without_damage() {
        let mut fleet = cruiser_fleet();
        let first = resolve_shot(Coord::new(2, 2), &mut fleet, &[]).expect("resolves");
        let hits_before = fleet.ship(ShipClass::Cruiser).map(Ship::hits);
        assert!(resolve_shot(Coord::new(2, 2), &mut fleet, &[first]).is_none());
        assert_eq!(fleet.ship(ShipClass::Cruiser).map(Ship::hits), hits_before);
    }

    #[test]
    fn off_grid_shot_is_rejected() {
        let mut fleet = cruiser_fleet();
        assert!(resolve_shot(Coord::new(10, 0), &mut fleet, &[]).is_none());
    }

    #[test]
    fn defeat_requires_every_ship_sunk() {
        let mut fleet = cruiser_fleet();
        fleet
            .place(ShipClass::Submarine, Coord::new(6, 6), Orientation::Vertical)
            .expect("fits");
        let mut shots = Vec::new();
        for coord in [Coord::new(2, 2), Coord::new(2, 3), Coord::new(2, 4)] {
            shots.push(resolve_shot(coord, &mut fleet, &shots).expect("resolves"));
        }
        assert!(!check_fleet_defeated(fleet.ships()));
    }

    #[test]
    fn stats_tally_accuracy() {
        let shots = [
            Shot { coord: Coord::new(0, 0), result: ShotResult::Hit, ship: Some(ShipClass::Cruiser) },
            Shot { coord: Coord::new(0, 1), result: ShotResult::Miss, ship: None },
            Shot { coord: Coord::new(0, 2), result: ShotResult::Sunk, ship: Some(ShipClass::Cruiser) },
        ];
        let stats = ShotStats::from_shots(&shots);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sunk, 1);
        assert_eq!(stats.accuracy, 67);
        assert_eq!(ShotStats::from_shots(&[]).accuracy, 0);
    }
}
