//! Results returned by committed match operations.

use crate::battleship::Shot;
use crate::guess::Evaluation;
use crate::identity::PlayerId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Where setup stands after a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupProgress {
    /// The other seat has not committed yet.
    AwaitingOpponent,
    /// Both seats committed. The match is now playing and the creator moves.
    Started,
}

/// Result of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GuessOutcome {
    /// Evaluation against the opponent's secret.
    evaluation: Evaluation,
    /// Whether the guess ended the match.
    finished: bool,
    /// Player to move next, `None` once finished.
    next_turn: Option<PlayerId>,
    /// Turn counter after the guess.
    turn_count: u32,
}

impl GuessOutcome {
    pub(crate) fn new(
        evaluation: Evaluation,
        finished: bool,
        next_turn: Option<PlayerId>,
        turn_count: u32,
    ) -> Self {
        Self {
            evaluation,
            finished,
            next_turn,
            turn_count,
        }
    }
}

/// Result of an accepted shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ShotOutcome {
    /// The resolved shot.
    shot: Shot,
    /// Whether the shooter keeps the turn.
    turn_retained: bool,
    /// Whether the shot sank the last ship.
    finished: bool,
    /// Player to move next, `None` once finished.
    next_turn: Option<PlayerId>,
    /// Turn counter after the shot.
    turn_count: u32,
}

impl ShotOutcome {
    pub(crate) fn new(
        shot: Shot,
        turn_retained: bool,
        finished: bool,
        next_turn: Option<PlayerId>,
        turn_count: u32,
    ) -> Self {
        Self {
            shot,
            turn_retained,
            finished,
            next_turn,
            turn_count,
        }
    }
}

/// Result of a turn lost to the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TurnForfeit {
    /// Player whose turn expired.
    forfeited_by: PlayerId,
    /// Player who now holds the turn.
    next_turn: PlayerId,
    /// Turn counter after the switch.
    turn_count: u32,
}

impl TurnForfeit {
    pub(crate) fn new(forfeited_by: PlayerId, next_turn: PlayerId, turn_count: u32) -> Self {
        Self {
            forfeited_by,
            next_turn,
            turn_count,
        }
    }
}
