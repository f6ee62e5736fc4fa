//! Status phases. Each phase carries only the data valid in it.

use crate::identity::{PlayerId, Side};
use serde::{Deserialize, Serialize};

/// Flat status tag, as stored and listed.
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
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MatchStatus {
    /// Created, waiting for an opponent.
    Waiting,
    /// Both seated, committing secrets or fleets.
    Setup,
    /// Taking turns.
    Playing,
    /// Won. Terminal.
    Finished,
}

/// Status together with the data only that status has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No opponent yet.
    Waiting,
    /// Opponent seated, nobody holds the turn.
    Setup {
        /// The joined player.
        opponent: PlayerId,
    },
    /// In play.
    Playing {
        /// The joined player.
        opponent: PlayerId,
        /// Seat allowed to act next.
        turn: Side,
    },
    /// Over.
    Finished {
        /// The joined player.
        opponent: PlayerId,
        /// Winning seat.
        winner: Side,
    },
}

impl Phase {
    /// The flat status tag.
    pub fn status(&self) -> MatchStatus {
        match self {
            Self::Waiting => MatchStatus::Waiting,
            Self::Setup { .. } => MatchStatus::Setup,
            Self::Playing { .. } => MatchStatus::Playing,
            Self::Finished { .. } => MatchStatus::Finished,
        }
    }

    /// The opponent, once one has joined.
    pub fn opponent(&self) -> Option<&PlayerId> {
        match self {
            Self::Waiting => None,
            Self::Setup { opponent }
            | Self::Playing { opponent, .. }
            | Self::Finished { opponent, .. } => Some(opponent),
        }
    }

    /// Seat holding the turn, while playing.
    pub fn turn(&self) -> Option<Side> {
        match self {
            Self::Playing { turn, .. } => Some(*turn),
            _ => None,
        }
    }

    /// Winning seat, once finished.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::Finished { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}
