//! Error taxonomy for match operations.
//!
//! Every error is detected before any state changes and leaves the match
//! able to accept a corrected retry.

use crate::battleship::{Coord, PlacementError};
use crate::guess::GuessError;
use crate::identity::PlayerId;
use crate::mode::GameMode;
use crate::secret::SecretError;
use crate::state_machine::MatchStatus;

/// A well-formed action that is not allowed in the match's current state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RejectedError {
    /// Another player holds the turn.
    #[display("It is not {}'s turn", _0)]
    NotYourTurn(PlayerId),

    /// Moves require a match in play.
    #[display("Match is {}, not PLAYING", _0)]
    NotPlaying(MatchStatus),

    /// Secrets and fleets are committed during setup only.
    #[display("Match is {}, not SETUP", _0)]
    NotInSetup(MatchStatus),

    /// Only a waiting match can be joined.
    #[display("Match is {}, not WAITING", _0)]
    NotWaiting(MatchStatus),

    /// The match is over and accepts nothing.
    #[display("Match is already finished")]
    MatchFinished,

    /// The shooter already fired at this cell.
    #[display("{} has already been shot", _0)]
    AlreadyShot(Coord),

    /// The target cell is off the grid.
    #[display("{} is off the grid", _0)]
    OffGrid(Coord),

    /// The action belongs to a different mode.
    #[display("Action not available in {} mode", _0)]
    WrongMode(GameMode),

    /// The player is not seated in this match.
    #[display("{} is not a player in this match", _0)]
    NotParticipant(PlayerId),

    /// The player's secret or fleet is already locked in.
    #[display("{} has already committed", _0)]
    AlreadyCommitted(PlayerId),

    /// The creator tried to join their own match.
    #[display("{} cannot join their own match", _0)]
    OwnMatch(PlayerId),

    /// The request was based on an older version of the match.
    #[display("Stale request: observed version {}, match is at {}", observed, current)]
    StaleVersion {
        /// Version the caller saw.
        observed: u64,
        /// Current version.
        current: u64,
    },
}

impl std::error::Error for RejectedError {}

/// Any error a match operation can produce.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum MatchError {
    /// Malformed secret.
    #[display("{}", _0)]
    InvalidSecret(SecretError),

    /// Malformed guess.
    #[display("{}", _0)]
    InvalidGuess(GuessError),

    /// Illegal fleet or ship placement.
    #[display("{}", _0)]
    InvalidPlacement(PlacementError),

    /// Action not allowed right now.
    #[display("{}", _0)]
    Rejected(RejectedError),
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSecret(e) => Some(e),
            Self::InvalidGuess(e) => Some(e),
            Self::InvalidPlacement(e) => Some(e),
            Self::Rejected(e) => Some(e),
        }
    }
}

impl MatchError {
    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSecret(_) => "invalid_secret",
            Self::InvalidGuess(GuessError::InvalidLength { .. }) => "invalid_guess_length",
            Self::InvalidGuess(_) => "invalid_guess",
            Self::InvalidPlacement(_) => "invalid_placement",
            Self::Rejected(RejectedError::StaleVersion { .. }) => "stale_state",
            Self::Rejected(_) => "rejected",
        }
    }
}
