//! Per-viewer snapshots that hide what a player must not see.
//!
//! A player sees their own secret and fleet in full. Of the opponent's they
//! see only revealed characters and sunk ships. A finished match hides
//! nothing.

use super::board::Board;
use super::game::Match;
use super::phase::MatchStatus;
use crate::battleship::{Ship, Shot, ShotStats};
use crate::history::HistoryEntry;
use crate::identity::{MatchId, PlayerId, Side};
use crate::mode::GameMode;
use crate::secret::CommittedSecret;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Placeholder for a hidden secret character.
const HIDDEN: char = '*';

/// One seat's secret as a viewer may see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretView {
    /// Whether the seat has committed a secret.
    pub committed: bool,
    /// Secret text with hidden characters masked, once committed.
    pub shown: Option<String>,
    /// Revealed mask.
    pub revealed: Vec<bool>,
}

/// One seat's fleet and shots as a viewer may see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetView {
    /// Whether the seat has committed a fleet.
    pub committed: bool,
    /// Visible ships: all of them for the owner, sunk ones for the opponent.
    pub ships: Vec<Ship>,
    /// Ships not yet sunk.
    pub ships_afloat: usize,
    /// Shots this seat has fired.
    pub shots_fired: Vec<Shot>,
    /// Accuracy of those shots.
    pub stats: ShotStats,
}

/// Board as a viewer may see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardView {
    /// Numbers or words.
    Code {
        /// Secret length.
        length: usize,
        /// Creator's secret.
        creator: SecretView,
        /// Opponent's secret.
        opponent: SecretView,
    },
    /// Battleship.
    Battle {
        /// Creator's fleet and shots.
        creator: FleetView,
        /// Opponent's fleet and shots.
        opponent: FleetView,
    },
}

/// Snapshot of a match for one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    /// Match id.
    pub id: MatchId,
    /// Creator.
    pub creator: PlayerId,
    /// Opponent, once joined.
    pub opponent: Option<PlayerId>,
    /// Mode.
    pub mode: GameMode,
    /// Status.
    pub status: MatchStatus,
    /// Player to move, while playing.
    pub current_turn: Option<PlayerId>,
    /// Winner, once finished.
    pub winner: Option<PlayerId>,
    /// Turn switches so far.
    pub turn_count: u32,
    /// Committed mutations so far.
    pub version: u64,
    /// Lobby title.
    pub title: Option<String>,
    /// Prize text.
    pub prize: Option<String>,
    /// Visible board state.
    pub board: BoardView,
    /// Move history.
    pub history: Vec<HistoryEntry>,
    /// Time of the last committed change.
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Snapshot as seen by `viewer`. `None` views as a spectator.
    #[instrument(skip(self), fields(match_id = %self.id()))]
    pub fn view_for(&self, viewer: Option<&PlayerId>) -> MatchView {
        let viewer_side = viewer.and_then(|player| self.side_of(player));
        let sees_all = |side: Side| {
            self.status() == MatchStatus::Finished || viewer_side == Some(side)
        };

        let board = match self.board() {
            Board::Code(code) => {
                let view_of = |side: Side| secret_view(code.secret(side), sees_all(side));
                BoardView::Code {
                    length: code.spec().length(),
                    creator: view_of(Side::Creator),
                    opponent: view_of(Side::Opponent),
                }
            }
            Board::Battle(battle) => {
                let view_of = |side: Side| {
                    let ships: Vec<Ship> = battle
                        .fleet(side)
                        .map(|fleet| {
                            fleet
                                .ships()
                                .iter()
                                .filter(|ship| sees_all(side) || ship.is_sunk())
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    let ships_afloat = battle
                        .fleet(side)
                        .map(|fleet| fleet.ships().len() - fleet.sunk_count())
                        .unwrap_or(0);
                    FleetView {
                        committed: battle.fleet(side).is_some(),
                        ships,
                        ships_afloat,
                        shots_fired: battle.shots(side).to_vec(),
                        stats: ShotStats::from_shots(battle.shots(side)),
                    }
                };
                BoardView::Battle {
                    creator: view_of(Side::Creator),
                    opponent: view_of(Side::Opponent),
                }
            }
        };

        MatchView {
            id: self.id(),
            creator: self.creator().clone(),
            opponent: self.opponent().cloned(),
            mode: self.mode(),
            status: self.status(),
            current_turn: self.current_turn().cloned(),
            winner: self.winner().cloned(),
            turn_count: self.turn_count(),
            version: self.version(),
            title: self.title().map(str::to_string),
            prize: self.prize().map(str::to_string),
            board,
            history: self.history().entries().to_vec(),
            updated_at: self.updated_at(),
        }
    }
}

fn secret_view(committed: Option<&CommittedSecret>, full: bool) -> SecretView {
    match committed {
        Some(committed) => SecretView {
            committed: true,
            shown: Some(if full {
                committed.secret().as_str().to_string()
            } else {
                committed
                    .revealed_characters()
                    .into_iter()
                    .map(|c| c.unwrap_or(HIDDEN))
                    .collect()
            }),
            revealed: committed.revealed().as_slice().to_vec(),
        },
        None => SecretView {
            committed: false,
            shown: None,
            revealed: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::{Match, MatchConfig, MatchId, ModeConfig, PlayerId};
    use crate::{BoardView, Fleet};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn numbers_match() -> (Match, PlayerId, PlayerId) {
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
        game.join(bob.clone()).expect("join");
        game.commit_secret(&alice, "1234").expect("commit");
        game.commit_secret(&bob, "5678").expect("commit");
        (game, alice, bob)
    }

    #[test]
    fn opponent_secret_is_masked_until_revealed() {
        let (mut game, alice, _) = numbers_match();
        game.submit_guess(&alice, "5000").expect("guess");
        let view = game.view_for(Some(&alice));
        let BoardView::Code { creator, opponent, .. } = view.board else {
            panic!("expected code board");
        };
        assert_eq!(creator.shown.as_deref(), Some("1234"));
        assert_eq!(opponent.shown.as_deref(), Some("5***"));
    }

    #[test]
    fn spectator_sees_nothing_hidden() {
        let (game, _, _) = numbers_match();
        let view = game.view_for(None);
        let BoardView::Code { creator, opponent, .. } = view.board else {
            panic!("expected code board");
        };
        assert_eq!(creator.shown.as_deref(), Some("****"));
        assert_eq!(opponent.shown.as_deref(), Some("****"));
    }

    #[test]
    fn finished_match_reveals_everything() {
        let (mut game, alice, _) = numbers_match();
        game.submit_guess(&alice, "5678").expect("guess");
        let view = game.view_for(None);
        let BoardView::Code { creator, .. } = view.board else {
            panic!("expected code board");
        };
        assert_eq!(creator.shown.as_deref(), Some("1234"));
    }

    #[test]
    fn opponent_fleet_is_hidden() {
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
        game.join(bob.clone()).expect("join");
        game.commit_fleet(&alice, Fleet::random(&mut rng).ships().to_vec()).expect("fleet");
        game.commit_fleet(&bob, Fleet::random(&mut rng).ships().to_vec()).expect("fleet");
        let view = game.view_for(Some(&alice));
        let BoardView::Battle { creator, opponent } = view.board else {
            panic!("expected battle board");
        };
        assert_eq!(creator.ships.len(), 5);
        assert!(opponent.ships.is_empty());
        assert_eq!(opponent.ships_afloat, 5);
    }
}
