//! Lifecycle tests for battleship matches.

use codebreak_engine::{
    Coord, Fleet, Match, MatchConfig, MatchError, MatchId, MatchStatus, ModeConfig, MoveRecord,
    Orientation, PlacementError, PlayerId, RandomOpponent, RejectedError, Ship, ShipClass,
    ShotResult, Side,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Every ship on an even row starting at column 0.
fn row_fleet() -> Vec<Ship> {
    let mut fleet = Fleet::new();
    let classes = [
        ShipClass::Carrier,
        ShipClass::Battleship,
        ShipClass::Cruiser,
        ShipClass::Destroyer,
        ShipClass::Submarine,
    ];
    for (i, class) in classes.into_iter().enumerate() {
        fleet
            .place(class, Coord::new(i * 2, 0), Orientation::Horizontal)
            .expect("Placement failed");
    }
    fleet.ships().to_vec()
}

fn battle_in_play() -> (Match, PlayerId, PlayerId) {
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");
    let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
    game.join(bob.clone()).expect("Join failed");
    game.commit_fleet(&alice, row_fleet()).expect("Alice fleet");
    game.commit_fleet(&bob, row_fleet()).expect("Bob fleet");
    (game, alice, bob)
}

#[test]
fn test_incomplete_fleet_is_rejected() {
    let alice = PlayerId::new("alice");
    let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
    game.join(PlayerId::new("bob")).expect("Join failed");
    let mut ships = row_fleet();
    ships.pop();
    let result = game.commit_fleet(&alice, ships);
    assert_eq!(
        result,
        Err(MatchError::InvalidPlacement(PlacementError::FleetIncomplete {
            placed: 4,
            required: 5
        }))
    );
    assert!(game.fleet(Side::Creator).is_none());
}

#[test]
fn test_touching_fleet_is_rejected() {
    let alice = PlayerId::new("alice");
    let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
    game.join(PlayerId::new("bob")).expect("Join failed");
    let mut ships = row_fleet();
    // Battleship moved to row 1, right under the carrier.
    ships[1] = Ship::placed(
        ShipClass::Battleship,
        (0..4).map(|col| Coord::new(1, col)).collect(),
    );
    let result = game.commit_fleet(&alice, ships);
    assert!(matches!(
        result,
        Err(MatchError::InvalidPlacement(PlacementError::TouchesNeighbor { .. }))
    ));
}

#[test]
fn test_sinking_cruiser_retains_turn() {
    let (mut game, alice, _) = battle_in_play();
    // Cruiser sits on row 4, columns 0..3.
    game.fire_shot(&alice, Coord::new(4, 0)).expect("hit");
    game.fire_shot(&alice, Coord::new(4, 1)).expect("hit");
    let outcome = game.fire_shot(&alice, Coord::new(4, 2)).expect("sunk");
    assert_eq!(outcome.shot().result, ShotResult::Sunk);
    assert_eq!(outcome.shot().ship, Some(ShipClass::Cruiser));
    assert!(*outcome.turn_retained());
    assert_eq!(game.current_turn(), Some(&alice));
    assert_eq!(game.turn_count(), 0);
}

#[test]
fn test_miss_flips_turn_and_counts() {
    let (mut game, alice, bob) = battle_in_play();
    let before = game.turn_count();
    let outcome = game.fire_shot(&alice, Coord::new(1, 5)).expect("miss");
    assert_eq!(outcome.shot().result, ShotResult::Miss);
    assert_eq!(game.current_turn(), Some(&bob));
    assert_eq!(game.turn_count(), before + 1);
}

#[test]
fn test_shot_out_of_turn_is_rejected() {
    let (mut game, _, bob) = battle_in_play();
    let before = game.clone();
    let result = game.fire_shot(&bob, Coord::new(0, 0));
    assert_eq!(result, Err(MatchError::Rejected(RejectedError::NotYourTurn(bob))));
    assert_eq!(game, before);
}

#[test]
fn test_seventeen_hits_win() {
    let (mut game, alice, bob) = battle_in_play();
    let targets: Vec<Coord> = row_fleet()
        .iter()
        .flat_map(|ship| ship.cells().to_vec())
        .collect();
    assert_eq!(targets.len(), 17);

    for (i, coord) in targets.iter().enumerate() {
        let outcome = game.fire_shot(&alice, *coord).expect("hit");
        if i + 1 < targets.len() {
            assert!(!*outcome.finished());
            assert!(game.fleet(Side::Opponent).is_some_and(|f| !f.is_defeated()));
        } else {
            assert!(*outcome.finished());
        }
    }

    assert_eq!(game.status(), MatchStatus::Finished);
    assert_eq!(game.winner(), Some(&alice));
    assert_eq!(game.current_turn(), None);
    assert_eq!(game.shots(Side::Creator).len(), 17);
    assert_eq!(game.fleet(Side::Opponent).map(Fleet::sunk_count), Some(5));
    assert!(matches!(
        game.fire_shot(&bob, Coord::new(9, 9)),
        Err(MatchError::Rejected(RejectedError::MatchFinished))
    ));
}

#[test]
fn test_history_holds_shots() {
    let (mut game, alice, bob) = battle_in_play();
    game.fire_shot(&alice, Coord::new(9, 9)).expect("miss");
    game.fire_shot(&bob, Coord::new(0, 0)).expect("hit");
    let records: Vec<ShotResult> = game
        .history()
        .entries()
        .iter()
        .filter_map(|entry| match entry.record() {
            MoveRecord::Shot(shot) => Some(shot.result),
            MoveRecord::Guess(_) => None,
        })
        .collect();
    assert_eq!(records, vec![ShotResult::Miss, ShotResult::Hit]);
}

#[test]
fn test_random_fleets_play_to_completion() {
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");
    let mut ai = RandomOpponent::new(StdRng::seed_from_u64(77));
    let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
    game.join(bob.clone()).expect("Join failed");
    let alice_fleet = ai.fleet();
    let bob_fleet = ai.fleet();
    game.commit_fleet(&alice, alice_fleet.ships().to_vec()).expect("fleet");
    game.commit_fleet(&bob, bob_fleet.ships().to_vec()).expect("fleet");

    while game.status() == MatchStatus::Playing {
        let player = game.current_turn().cloned().expect("turn owner");
        let side = game.side_of(&player).expect("seated");
        let target = ai.shot(game.shots(side)).expect("cells remain");
        game.fire_shot(&player, target).expect("legal shot");
    }
    let winner = game.winner().expect("winner");
    let side = game.side_of(winner).expect("seated");
    let hits = game
        .shots(side)
        .iter()
        .filter(|shot| shot.is_hit())
        .count();
    assert_eq!(hits, 17);
}
