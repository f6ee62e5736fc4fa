//! Match lifecycle: `WAITING → SETUP → PLAYING → FINISHED`.
//!
//! Status and board are sum types, so a battleship match cannot carry a
//! secret and a waiting match cannot have a turn owner.

mod board;
mod game;
mod outcome;
mod phase;
mod view;

pub use board::{BattleBoard, Board, CodeBoard, Seats};
pub use game::{Match, MatchConfig};
pub use outcome::{GuessOutcome, SetupProgress, ShotOutcome, TurnForfeit};
pub use phase::{MatchStatus, Phase};
pub use view::{BoardView, FleetView, MatchView, SecretView};
