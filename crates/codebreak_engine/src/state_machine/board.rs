//! Mode-specific match state.

use crate::battleship::{Fleet, Shot};
use crate::identity::Side;
use crate::mode::{GameMode, ModeConfig};
use crate::secret::{Charset, CommittedSecret, SecretSpec, WordLength};
use serde::{Deserialize, Serialize};

/// A value per seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats<T> {
    /// Creator's value.
    pub creator: T,
    /// Opponent's value.
    pub opponent: T,
}

impl<T> Seats<T> {
    /// Value for `side`.
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Creator => &self.creator,
            Side::Opponent => &self.opponent,
        }
    }

    /// Mutable value for `side`.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Creator => &mut self.creator,
            Side::Opponent => &mut self.opponent,
        }
    }
}

/// Numbers and words state: one secret per seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBoard {
    spec: SecretSpec,
    secrets: Seats<Option<CommittedSecret>>,
}

impl CodeBoard {
    /// Shape of secrets and guesses.
    pub fn spec(&self) -> SecretSpec {
        self.spec
    }

    /// Committed secret for `side`, if any.
    pub fn secret(&self, side: Side) -> Option<&CommittedSecret> {
        self.secrets.get(side).as_ref()
    }

    pub(crate) fn secret_mut(&mut self, side: Side) -> &mut Option<CommittedSecret> {
        self.secrets.get_mut(side)
    }

    /// Whether both seats have committed.
    pub fn both_committed(&self) -> bool {
        self.secrets.creator.is_some() && self.secrets.opponent.is_some()
    }
}

/// Battleship state: one fleet and one shot list per seat.
///
/// `shots` holds the shots each seat has fired at the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleBoard {
    fleets: Seats<Option<Fleet>>,
    shots: Seats<Vec<Shot>>,
}

impl BattleBoard {
    /// Committed fleet for `side`, if any.
    pub fn fleet(&self, side: Side) -> Option<&Fleet> {
        self.fleets.get(side).as_ref()
    }

    /// Shots fired by `side`, oldest first.
    pub fn shots(&self, side: Side) -> &[Shot] {
        self.shots.get(side)
    }

    /// Whether both seats have committed a complete fleet.
    pub fn both_committed(&self) -> bool {
        self.fleets.creator.is_some() && self.fleets.opponent.is_some()
    }

    pub(crate) fn fleet_slot(&mut self, side: Side) -> &mut Option<Fleet> {
        self.fleets.get_mut(side)
    }

    /// Shooter's history and target's fleet, borrowed together.
    pub(crate) fn engagement(&mut self, shooter: Side) -> (&mut Vec<Shot>, Option<&mut Fleet>) {
        let Self { fleets, shots } = self;
        (
            shots.get_mut(shooter),
            fleets.get_mut(shooter.other()).as_mut(),
        )
    }
}

/// Per-mode match state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Board {
    /// Numbers or words.
    Code(CodeBoard),
    /// Battleship.
    Battle(BattleBoard),
}

impl Board {
    /// Empty board for a new match.
    pub fn for_mode(config: ModeConfig) -> Self {
        match config.secret_spec() {
            Some(spec) => Self::Code(CodeBoard {
                spec,
                secrets: Seats::default(),
            }),
            None => Self::Battle(BattleBoard::default()),
        }
    }

    /// The mode this board plays.
    pub fn mode(&self) -> GameMode {
        self.mode_config().mode()
    }

    /// Configuration equivalent to the one the board was built from.
    pub fn mode_config(&self) -> ModeConfig {
        match self {
            Self::Code(code) => match code.spec.charset() {
                Charset::Digits => ModeConfig::Numbers,
                Charset::Letters(alphabet) => ModeConfig::Words {
                    length: WordLength::try_from(code.spec.length()).unwrap_or_default(),
                    alphabet,
                },
            },
            Self::Battle(_) => ModeConfig::Battleship,
        }
    }

    /// Whether both seats have committed their secret or fleet.
    pub fn both_committed(&self) -> bool {
        match self {
            Self::Code(code) => code.both_committed(),
            Self::Battle(battle) => battle.both_committed(),
        }
    }
}
