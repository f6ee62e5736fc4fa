//! The match aggregate and its transitions.

use super::board::Board;
use super::outcome::{GuessOutcome, SetupProgress, ShotOutcome, TurnForfeit};
use super::phase::{MatchStatus, Phase};
use crate::battleship::{Coord, Fleet, Ship, Shot, resolve_shot};
use crate::error::{MatchError, RejectedError};
use crate::guess::{evaluate, validate_guess};
use crate::history::{GuessRecord, HistoryEntry, MoveRecord, TurnLog};
use crate::identity::{EntryId, MatchId, PlayerId, Side};
use crate::mode::{GameMode, ModeConfig};
use crate::secret::{CommittedSecret, RevealedMask};
use chrono::{DateTime, Utc};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Settings chosen when a match is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct MatchConfig {
    /// Mode and its parameters.
    pub mode: ModeConfig,
    /// Optional lobby title.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional stake the winner claims.
    #[serde(default)]
    pub prize: Option<String>,
}

impl MatchConfig {
    /// Config for `mode` with no title or prize.
    pub fn new(mode: ModeConfig) -> Self {
        Self {
            mode,
            title: None,
            prize: None,
        }
    }
}

/// One two-player match.
///
/// Every operation validates fully before it changes anything, and every
/// committed change bumps [`Match::version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    creator: PlayerId,
    phase: Phase,
    board: Board,
    turn_count: u32,
    version: u64,
    title: Option<String>,
    prize: Option<String>,
    history: TurnLog,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Match {
    // ───── Lobby ─────

    /// Opens a new match in WAITING.
    #[instrument(skip(config), fields(match_id = %id, creator = %creator, mode = %config.mode.mode()))]
    pub fn create(id: MatchId, creator: PlayerId, config: MatchConfig) -> Self {
        let now = Utc::now();
        info!("Match created");
        Self {
            id,
            creator,
            phase: Phase::Waiting,
            board: Board::for_mode(config.mode),
            turn_count: 0,
            version: 0,
            title: config.title,
            prize: config.prize,
            history: TurnLog::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Seats `opponent` and moves the match to SETUP.
    ///
    /// # Errors
    ///
    /// Rejected unless the match is WAITING and `opponent` is not the creator.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn join(&mut self, opponent: PlayerId) -> Result<(), MatchError> {
        match self.phase {
            Phase::Waiting => {}
            Phase::Finished { .. } => return Err(RejectedError::MatchFinished.into()),
            _ => return Err(RejectedError::NotWaiting(self.status()).into()),
        }
        if opponent == self.creator {
            warn!(player = %opponent, "Creator tried to join own match");
            return Err(RejectedError::OwnMatch(opponent).into());
        }
        info!(opponent = %opponent, "Opponent joined");
        self.phase = Phase::Setup { opponent };
        self.touch();
        Ok(())
    }

    // ───── Setup Phase ─────

    /// Locks in `player`'s secret. Starts play once both seats committed.
    ///
    /// # Errors
    ///
    /// Rejected outside SETUP, for non-players, in battleship mode or on a
    /// second commit. [`MatchError::InvalidSecret`] for malformed input.
    #[instrument(skip(self, raw), fields(match_id = %self.id, player = %player))]
    pub fn commit_secret(&mut self, player: &PlayerId, raw: &str) -> Result<SetupProgress, MatchError> {
        let side = self.setup_seat(player)?;
        let mode = self.mode();
        let Board::Code(code) = &mut self.board else {
            return Err(RejectedError::WrongMode(mode).into());
        };
        let spec = code.spec();
        let slot = code.secret_mut(side);
        if slot.is_some() {
            warn!("Secret already committed");
            return Err(RejectedError::AlreadyCommitted(player.clone()).into());
        }
        let committed = CommittedSecret::commit(raw, spec)?;
        *slot = Some(committed);
        info!(%side, "Secret committed");
        Ok(self.finish_setup_step())
    }

    /// Locks in `player`'s fleet. Starts play once both seats committed.
    ///
    /// # Errors
    ///
    /// Rejected outside SETUP, for non-players, in code modes or on a second
    /// commit. [`MatchError::InvalidPlacement`] for an illegal fleet.
    #[instrument(skip(self, ships), fields(match_id = %self.id, player = %player, ships = ships.len()))]
    pub fn commit_fleet(&mut self, player: &PlayerId, ships: Vec<Ship>) -> Result<SetupProgress, MatchError> {
        let side = self.setup_seat(player)?;
        let mode = self.mode();
        let Board::Battle(battle) = &mut self.board else {
            return Err(RejectedError::WrongMode(mode).into());
        };
        let slot = battle.fleet_slot(side);
        if slot.is_some() {
            warn!("Fleet already committed");
            return Err(RejectedError::AlreadyCommitted(player.clone()).into());
        }
        let fleet = Fleet::validate(ships)?;
        *slot = Some(fleet);
        info!(%side, "Fleet committed");
        Ok(self.finish_setup_step())
    }

    fn setup_seat(&self, player: &PlayerId) -> Result<Side, MatchError> {
        match self.phase {
            Phase::Setup { .. } => {}
            Phase::Finished { .. } => return Err(RejectedError::MatchFinished.into()),
            _ => return Err(RejectedError::NotInSetup(self.status()).into()),
        }
        self.side_of(player)
            .ok_or_else(|| RejectedError::NotParticipant(player.clone()).into())
    }

    fn finish_setup_step(&mut self) -> SetupProgress {
        let progress = match (&self.phase, self.board.both_committed()) {
            (Phase::Setup { opponent }, true) => {
                self.phase = Phase::Playing {
                    opponent: opponent.clone(),
                    turn: Side::Creator,
                };
                info!(match_id = %self.id, first = %self.creator, "Match started");
                SetupProgress::Started
            }
            _ => SetupProgress::AwaitingOpponent,
        };
        self.touch();
        progress
    }

    // ───── Playing Phase ─────

    /// Guesses the opponent's secret.
    ///
    /// A correct guess wins. Any other guess reveals matching positions and
    /// passes the turn.
    ///
    /// # Errors
    ///
    /// Rejected unless `player` holds the turn in a code match.
    /// [`MatchError::InvalidGuess`] for malformed input.
    #[instrument(skip(self, guess), fields(match_id = %self.id, player = %player))]
    pub fn submit_guess(&mut self, player: &PlayerId, guess: &str) -> Result<GuessOutcome, MatchError> {
        let side = self.acting_seat(player)?;
        let mode = self.mode();
        let Board::Code(code) = &mut self.board else {
            return Err(RejectedError::WrongMode(mode).into());
        };
        let guess = validate_guess(guess, code.spec())?;
        let Some(target) = code.secret_mut(side.other()) else {
            return Err(RejectedError::NotPlaying(MatchStatus::Setup).into());
        };
        let evaluation = evaluate(&guess, target.secret(), target.revealed())?;
        target.set_revealed(evaluation.new_mask().clone());

        let record = GuessRecord::new(
            evaluation.guess().clone(),
            *evaluation.label(),
            evaluation.newly_revealed_count(),
        );
        self.record(player, MoveRecord::Guess(record));

        let finished = *evaluation.is_win();
        if finished {
            self.finish(side);
        } else {
            self.pass_turn(side);
        }
        info!(label = %evaluation.label(), finished, "Guess accepted");
        let next_turn = self.current_turn().cloned();
        self.touch();
        Ok(GuessOutcome::new(evaluation, finished, next_turn, self.turn_count))
    }

    /// Fires at `target` on the opponent's grid.
    ///
    /// Sinking the last ship wins. A hit keeps the turn; a miss passes it.
    ///
    /// # Errors
    ///
    /// Rejected unless `player` holds the turn in a battleship match and the
    /// cell is on the grid and not yet fired at.
    #[instrument(skip(self), fields(match_id = %self.id, player = %player))]
    pub fn fire_shot(&mut self, player: &PlayerId, target: Coord) -> Result<ShotOutcome, MatchError> {
        let side = self.acting_seat(player)?;
        let mode = self.mode();
        let Board::Battle(battle) = &mut self.board else {
            return Err(RejectedError::WrongMode(mode).into());
        };
        if !target.is_on_grid() {
            warn!(%target, "Shot off the grid");
            return Err(RejectedError::OffGrid(target).into());
        }
        let (shots, fleet) = battle.engagement(side);
        let Some(fleet) = fleet else {
            return Err(RejectedError::NotPlaying(MatchStatus::Setup).into());
        };
        let Some(shot) = resolve_shot(target, fleet, shots.as_slice()) else {
            warn!(%target, "Cell already shot");
            return Err(RejectedError::AlreadyShot(target).into());
        };
        shots.push(shot);
        let defeated = fleet.is_defeated();
        self.record(player, MoveRecord::Shot(shot));

        let turn_retained = !defeated && shot.is_hit();
        if defeated {
            self.finish(side);
        } else if !turn_retained {
            self.pass_turn(side);
        }
        info!(%target, result = %shot.result, turn_retained, finished = defeated, "Shot accepted");
        let next_turn = self.current_turn().cloned();
        self.touch();
        Ok(ShotOutcome::new(shot, turn_retained, defeated, next_turn, self.turn_count))
    }

    /// Passes the turn after the turn timer ran out. Nothing is recorded.
    ///
    /// `observed_version` is the version the timer was armed at; a request
    /// from before a later move is stale.
    ///
    /// # Errors
    ///
    /// Rejected unless the match is PLAYING at `observed_version`.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn forfeit_turn(&mut self, observed_version: u64) -> Result<TurnForfeit, MatchError> {
        let turn = match self.phase {
            Phase::Playing { turn, .. } => turn,
            Phase::Finished { .. } => return Err(RejectedError::MatchFinished.into()),
            _ => return Err(RejectedError::NotPlaying(self.status()).into()),
        };
        if observed_version != self.version {
            warn!(observed_version, current = self.version, "Stale timeout");
            return Err(RejectedError::StaleVersion {
                observed: observed_version,
                current: self.version,
            }
            .into());
        }
        let forfeited_by = self.player(turn).cloned();
        self.pass_turn(turn);
        let next_turn = self.player(turn.other()).cloned();
        info!(turn_count = self.turn_count, "Turn forfeited on timeout");
        self.touch();
        match (forfeited_by, next_turn) {
            (Some(forfeited_by), Some(next_turn)) => {
                Ok(TurnForfeit::new(forfeited_by, next_turn, self.turn_count))
            }
            _ => Err(RejectedError::NotPlaying(self.status()).into()),
        }
    }

    fn acting_seat(&self, player: &PlayerId) -> Result<Side, MatchError> {
        let turn = match self.phase {
            Phase::Playing { turn, .. } => turn,
            Phase::Finished { .. } => return Err(RejectedError::MatchFinished.into()),
            _ => return Err(RejectedError::NotPlaying(self.status()).into()),
        };
        let side = self
            .side_of(player)
            .ok_or_else(|| MatchError::from(RejectedError::NotParticipant(player.clone())))?;
        if side != turn {
            warn!(player = %player, "Move out of turn");
            return Err(RejectedError::NotYourTurn(player.clone()).into());
        }
        Ok(side)
    }

    fn record(&mut self, player: &PlayerId, record: MoveRecord) {
        let entry = HistoryEntry::new(
            EntryId::generate(),
            player.clone(),
            self.turn_count,
            record,
            Utc::now(),
        );
        self.history.append(entry);
    }

    fn pass_turn(&mut self, from: Side) {
        if let Phase::Playing { turn, .. } = &mut self.phase {
            *turn = from.other();
            self.turn_count += 1;
        }
    }

    fn finish(&mut self, winner: Side) {
        if let Phase::Playing { opponent, .. } = &self.phase {
            self.phase = Phase::Finished {
                opponent: opponent.clone(),
                winner,
            };
            info!(match_id = %self.id, %winner, "Match finished");
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    // ───── Accessors ─────

    /// Match id.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Creator's id.
    pub fn creator(&self) -> &PlayerId {
        &self.creator
    }

    /// Opponent's id, once joined.
    pub fn opponent(&self) -> Option<&PlayerId> {
        self.phase.opponent()
    }

    /// Player seated at `side`.
    pub fn player(&self, side: Side) -> Option<&PlayerId> {
        match side {
            Side::Creator => Some(&self.creator),
            Side::Opponent => self.opponent(),
        }
    }

    /// Seat of `player`, if seated.
    pub fn side_of(&self, player: &PlayerId) -> Option<Side> {
        if *player == self.creator {
            Some(Side::Creator)
        } else if self.opponent() == Some(player) {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    /// Phase with its data.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Flat status.
    pub fn status(&self) -> MatchStatus {
        self.phase.status()
    }

    /// Mode-specific state.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mode tag.
    pub fn mode(&self) -> GameMode {
        self.board.mode()
    }

    /// Mode with its parameters.
    pub fn mode_config(&self) -> ModeConfig {
        self.board.mode_config()
    }

    /// Secret length for code modes.
    pub fn secret_length(&self) -> Option<usize> {
        match &self.board {
            Board::Code(code) => Some(code.spec().length()),
            Board::Battle(_) => None,
        }
    }

    /// Player allowed to move, while PLAYING.
    pub fn current_turn(&self) -> Option<&PlayerId> {
        self.phase.turn().and_then(|side| self.player(side))
    }

    /// Winner, once FINISHED.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.phase.winner().and_then(|side| self.player(side))
    }

    /// Turn switches so far.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Committed mutations so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Lobby title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Prize text.
    pub fn prize(&self) -> Option<&str> {
        self.prize.as_deref()
    }

    /// Move history.
    pub fn history(&self) -> &TurnLog {
        &self.history
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last committed change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Revealed mask of `side`'s secret, in code modes after commit.
    pub fn revealed_mask(&self, side: Side) -> Option<&RevealedMask> {
        match &self.board {
            Board::Code(code) => code.secret(side).map(CommittedSecret::revealed),
            Board::Battle(_) => None,
        }
    }

    /// Revealed characters of `side`'s secret, `None` where hidden.
    pub fn revealed_characters(&self, side: Side) -> Option<Vec<Option<char>>> {
        match &self.board {
            Board::Code(code) => code.secret(side).map(CommittedSecret::revealed_characters),
            Board::Battle(_) => None,
        }
    }

    /// `side`'s fleet, in battleship after commit.
    pub fn fleet(&self, side: Side) -> Option<&Fleet> {
        match &self.board {
            Board::Battle(battle) => battle.fleet(side),
            Board::Code(_) => None,
        }
    }

    /// Shots fired by `side`.
    pub fn shots(&self, side: Side) -> &[Shot] {
        match &self.board {
            Board::Battle(battle) => battle.shots(side),
            Board::Code(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battleship::{Orientation, ShipClass};

    fn players() -> (PlayerId, PlayerId) {
        (PlayerId::new("alice"), PlayerId::new("bob"))
    }

    fn numbers_in_play() -> (Match, PlayerId, PlayerId) {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
        game.join(bob.clone()).expect("join");
        game.commit_secret(&alice, "1234").expect("alice commits");
        game.commit_secret(&bob, "5678").expect("bob commits");
        (game, alice, bob)
    }

    /// Fleet with every ship in its own row pair, columns 0..len.
    fn row_fleet() -> Vec<Ship> {
        let mut fleet = Fleet::new();
        for (i, class) in [
            ShipClass::Carrier,
            ShipClass::Battleship,
            ShipClass::Cruiser,
            ShipClass::Destroyer,
            ShipClass::Submarine,
        ]
        .into_iter()
        .enumerate()
        {
            fleet
                .place(class, Coord::new(i * 2, 0), Orientation::Horizontal)
                .expect("fits");
        }
        fleet.ships().to_vec()
    }

    #[test]
    fn creator_cannot_join_own_match() {
        let (alice, _) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
        let err = game.join(alice.clone()).unwrap_err();
        assert_eq!(err, MatchError::Rejected(RejectedError::OwnMatch(alice)));
        assert_eq!(game.status(), MatchStatus::Waiting);
        assert_eq!(game.version(), 0);
    }

    #[test]
    fn second_join_is_rejected() {
        let (mut game, _, _) = numbers_in_play();
        let err = game.join(PlayerId::new("carol")).unwrap_err();
        assert_eq!(err, MatchError::Rejected(RejectedError::NotWaiting(MatchStatus::Playing)));
    }

    #[test]
    fn secret_is_immutable_once_committed() {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
        game.join(bob).expect("join");
        game.commit_secret(&alice, "1234").expect("commit");
        let before = game.clone();
        let err = game.commit_secret(&alice, "9999").unwrap_err();
        assert_eq!(err, MatchError::Rejected(RejectedError::AlreadyCommitted(alice)));
        assert_eq!(game, before);
    }

    #[test]
    fn invalid_secret_leaves_setup_unchanged() {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Numbers));
        game.join(bob).expect("join");
        let before = game.clone();
        assert!(matches!(
            game.commit_secret(&alice, "12"),
            Err(MatchError::InvalidSecret(_))
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn creator_moves_first() {
        let (game, alice, _) = numbers_in_play();
        assert_eq!(game.status(), MatchStatus::Playing);
        assert_eq!(game.current_turn(), Some(&alice));
        assert_eq!(game.turn_count(), 0);
    }

    #[test]
    fn out_of_turn_guess_is_rejected_without_mutation() {
        let (mut game, _, bob) = numbers_in_play();
        let before = game.clone();
        let err = game.submit_guess(&bob, "1234").unwrap_err();
        assert_eq!(err, MatchError::Rejected(RejectedError::NotYourTurn(bob)));
        assert_eq!(game, before);
    }

    #[test]
    fn wrong_length_guess_is_rejected_without_mutation() {
        let (mut game, alice, _) = numbers_in_play();
        let before = game.clone();
        let err = game.submit_guess(&alice, "567").unwrap_err();
        assert_eq!(err.code(), "invalid_guess_length");
        assert_eq!(game, before);
    }

    #[test]
    fn every_guess_passes_the_turn() {
        let (mut game, alice, bob) = numbers_in_play();
        let outcome = game.submit_guess(&alice, "5600").expect("guess");
        assert_eq!(outcome.evaluation().newly_revealed_count(), 2);
        assert_eq!(outcome.next_turn(), &Some(bob.clone()));
        assert_eq!(game.turn_count(), 1);
        game.submit_guess(&bob, "0000").expect("guess");
        assert_eq!(game.current_turn(), Some(&alice));
        assert_eq!(game.turn_count(), 2);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn guesses_accumulate_reveals_on_the_opponents_secret() {
        let (mut game, alice, bob) = numbers_in_play();
        game.submit_guess(&alice, "5000").expect("guess");
        game.submit_guess(&bob, "0000").expect("guess");
        game.submit_guess(&alice, "0070").expect("guess");
        let mask = game.revealed_mask(Side::Opponent).expect("committed");
        assert_eq!(mask.as_slice(), &[true, false, true, false]);
        assert_eq!(
            game.revealed_characters(Side::Opponent),
            Some(vec![Some('5'), None, Some('7'), None])
        );
    }

    #[test]
    fn winning_guess_finishes_the_match() {
        let (mut game, alice, bob) = numbers_in_play();
        let outcome = game.submit_guess(&alice, "5678").expect("guess");
        assert!(*outcome.finished());
        assert_eq!(game.status(), MatchStatus::Finished);
        assert_eq!(game.winner(), Some(&alice));
        assert_eq!(game.current_turn(), None);
        assert_eq!(game.turn_count(), 0);
        let err = game.submit_guess(&bob, "1234").unwrap_err();
        assert_eq!(err, MatchError::Rejected(RejectedError::MatchFinished));
    }

    #[test]
    fn guess_rejected_in_battleship() {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
        game.join(bob.clone()).expect("join");
        assert_eq!(
            game.commit_secret(&alice, "1234").unwrap_err(),
            MatchError::Rejected(RejectedError::WrongMode(GameMode::Battleship))
        );
        game.commit_fleet(&alice, row_fleet()).expect("fleet");
        game.commit_fleet(&bob, row_fleet()).expect("fleet");
        assert_eq!(
            game.submit_guess(&alice, "1234").unwrap_err(),
            MatchError::Rejected(RejectedError::WrongMode(GameMode::Battleship))
        );
    }

    #[test]
    fn hit_keeps_turn_and_miss_passes_it() {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
        game.join(bob.clone()).expect("join");
        game.commit_fleet(&alice, row_fleet()).expect("fleet");
        game.commit_fleet(&bob, row_fleet()).expect("fleet");

        let hit = game.fire_shot(&alice, Coord::new(0, 0)).expect("shot");
        assert!(*hit.turn_retained());
        assert_eq!(game.current_turn(), Some(&alice));
        assert_eq!(game.turn_count(), 0);

        let miss = game.fire_shot(&alice, Coord::new(9, 9)).expect("shot");
        assert!(!*miss.turn_retained());
        assert_eq!(game.current_turn(), Some(&bob));
        assert_eq!(game.turn_count(), 1);
    }

    #[test]
    fn repeated_cell_is_rejected() {
        let (alice, bob) = players();
        let mut game = Match::create(MatchId::generate(), alice.clone(), MatchConfig::new(ModeConfig::Battleship));
        game.join(bob.clone()).expect("join");
        game.commit_fleet(&alice, row_fleet()).expect("fleet");
        game.commit_fleet(&bob, row_fleet()).expect("fleet");
        game.fire_shot(&alice, Coord::new(0, 0)).expect("shot");
        let before = game.clone();
        assert_eq!(
            game.fire_shot(&alice, Coord::new(0, 0)).unwrap_err(),
            MatchError::Rejected(RejectedError::AlreadyShot(Coord::new(0, 0)))
        );
        assert_eq!(
            game.fire_shot(&alice, Coord::new(0, 10)).unwrap_err(),
            MatchError::Rejected(RejectedError::OffGrid(Coord::new(0, 10)))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn forfeit_passes_turn_without_history() {
        let (mut game, alice, bob) = numbers_in_play();
        let version = game.version();
        let forfeit = game.forfeit_turn(version).expect("forfeit");
        assert_eq!(forfeit.forfeited_by(), &alice);
        assert_eq!(forfeit.next_turn(), &bob);
        assert_eq!(game.turn_count(), 1);
        assert!(game.history().is_empty());
    }

    #[test]
    fn stale_forfeit_is_rejected() {
        let (mut game, alice, _) = numbers_in_play();
        let armed_at = game.version();
        game.submit_guess(&alice, "0000").expect("guess");
        let err = game.forfeit_turn(armed_at).unwrap_err();
        assert_eq!(err.code(), "stale_state");
        assert_eq!(game.turn_count(), 1);
    }

    #[test]
    fn forfeit_before_play_is_rejected() {
        let (alice, _) = players();
        let mut game = Match::create(MatchId::generate(), alice, MatchConfig::new(ModeConfig::Numbers));
        assert_eq!(
            game.forfeit_turn(0).unwrap_err(),
            MatchError::Rejected(RejectedError::NotPlaying(MatchStatus::Waiting))
        );
    }

    #[test]
    fn config_setters_fill_metadata() {
        let config = MatchConfig::new(ModeConfig::words())
            .with_title("Friday duel")
            .with_prize("coffee");
        let game = Match::create(MatchId::generate(), PlayerId::new("alice"), config);
        assert_eq!(game.title(), Some("Friday duel"));
        assert_eq!(game.prize(), Some("coffee"));
        assert_eq!(game.secret_length(), Some(5));
    }
}
