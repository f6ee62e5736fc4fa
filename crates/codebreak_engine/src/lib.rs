//! Codebreak engine - deterministic rules for two-player duels
//!
//! Three modes share one match lifecycle:
//!
//! - **Numbers**: guess the opponent's four-digit code
//! - **Words**: guess the opponent's word (5, 6 or 10 letters)
//! - **Battleship**: sink the opponent's five-ship fleet on a 10×10 grid
//!
//! # Architecture
//!
//! - **Secret**: hidden codes and their monotonic revealed masks
//! - **Guess**: strictly positional evaluation of guesses
//! - **Battleship**: placement validation, random fleets and shot resolution
//! - **State machine**: `WAITING → SETUP → PLAYING → FINISHED`, turn ownership
//! - **History**: append-only, idempotent turn log
//!
//! The engine performs no I/O. Every operation either commits completely or
//! returns an error and leaves the match untouched.
//!
//! # Example
//!
//! ```
//! use codebreak_engine::{Match, MatchConfig, MatchId, ModeConfig, PlayerId};
//!
//! let alice = PlayerId::new("alice");
//! let bob = PlayerId::new("bob");
//! let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
//!
//! game.join(bob.clone()).unwrap();
//! game.commit_secret(&alice, "1234").unwrap();
//! game.commit_secret(&bob, "5678").unwrap();
//!
//! let outcome = game.submit_guess(&alice, "5611").unwrap();
//! assert_eq!(outcome.evaluation().newly_revealed_count(), 2);
//! assert_eq!(game.current_turn(), Some(&bob));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ai;
mod battleship;
mod error;
mod guess;
mod history;
mod identity;
mod mode;
mod secret;
mod state_machine;

// Crate-level exports - Identity
pub use identity::{EntryId, MatchId, PlayerId, Side};

// Crate-level exports - Errors
pub use error::{MatchError, RejectedError};

// Crate-level exports - Secret model
pub use secret::{Alphabet, Charset, CommittedSecret, NUMBER_LENGTH, RevealedMask, Secret, SecretError, SecretSpec, WordLength};

// Crate-level exports - Guess evaluation
pub use guess::{Evaluation, GuessError, ResultLabel, evaluate};

// Crate-level exports - Battleship
pub use battleship::{
    Coord, Fleet, GRID_SIZE, MAX_ATTEMPTS_PER_SHIP, Orientation, PlacementError, Ship, ShipClass,
    Shot, ShotResult, ShotStats, check_fleet_defeated, place_ship, resolve_shot, ship_cells,
    validate_placement,
};

// Crate-level exports - Modes
pub use mode::{GameMode, ModeConfig};

// Crate-level exports - History
pub use history::{GuessRecord, HistoryEntry, MoveRecord, TurnLog};

// Crate-level exports - State machine
pub use state_machine::{
    BattleBoard, Board, BoardView, CodeBoard, FleetView, GuessOutcome, Match, MatchConfig,
    MatchStatus, MatchView, Phase, Seats, SecretView, SetupProgress, ShotOutcome, TurnForfeit,
};

// Crate-level exports - Automated opponent
pub use ai::RandomOpponent;
