//! The authoritative match service.
//!
//! Mutations of one match are serialized behind a per-match lock, validated
//! by the engine, saved with an optimistic version check, then published to
//! subscribers and handed to the notifier. The turn timer is re-armed after
//! every committed move of a playing match.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use codebreak_engine::{
    Alphabet, Coord, GameMode, GuessOutcome, HistoryEntry, Match, MatchConfig, MatchError,
    MatchId, MatchStatus, MatchView, ModeConfig, PlayerId, SetupProgress, Ship, ShotOutcome,
    TurnForfeit, WordLength,
};
use derive_getters::Getters;
use derive_new::new;
use futures::future::BoxFuture;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::ServiceError;
use crate::events::{EventHub, MatchEvent, Subscription, Transition};
use crate::notifier::{MatchNotifier, TracingNotifier};
use crate::store::{MatchStore, StoreError};
use crate::timers::TurnTimers;

/// Tunables of one service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct ServiceSettings {
    /// Time a player has to move before the turn passes.
    turn_duration: Duration,
    /// Word length when a words match does not name one.
    default_word_length: WordLength,
    /// Alphabet when a words match does not name one.
    default_alphabet: Alphabet,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_secs(120),
            default_word_length: WordLength::default(),
            default_alphabet: Alphabet::default(),
        }
    }
}

type LockTable = Mutex<HashMap<MatchId, Arc<tokio::sync::Mutex<()>>>>;

struct Inner {
    store: Arc<dyn MatchStore>,
    events: EventHub,
    timers: TurnTimers,
    notifier: Arc<dyn MatchNotifier>,
    locks: LockTable,
    settings: ServiceSettings,
}

/// Exclusive hold on one match. The table entry is pruned on release when
/// no other caller holds or awaits it.
struct MatchLock<'a> {
    table: &'a LockTable,
    match_id: MatchId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for MatchLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let Ok(mut locks) = self.table.lock() else {
            return;
        };
        if locks
            .get(&self.match_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.match_id);
        }
    }
}

/// Shared handle to the match service. Cloning is cheap.
#[derive(Clone)]
pub struct MatchService {
    inner: Arc<Inner>,
}

impl fmt::Debug for MatchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchService")
            .field("store", &self.inner.store)
            .field("settings", &self.inner.settings)
            .field("armed_timers", &self.inner.timers.armed_count())
            .finish()
    }
}

impl MatchService {
    /// Service over `store` that logs transitions.
    pub fn new(store: Arc<dyn MatchStore>, settings: ServiceSettings) -> Self {
        Self::with_notifier(store, settings, Arc::new(TracingNotifier))
    }

    /// Service over `store` reporting transitions to `notifier`.
    #[instrument(skip(store, notifier))]
    pub fn with_notifier(
        store: Arc<dyn MatchStore>,
        settings: ServiceSettings,
        notifier: Arc<dyn MatchNotifier>,
    ) -> Self {
        info!("Match service ready");
        Self {
            inner: Arc::new(Inner {
                store,
                events: EventHub::new(),
                timers: TurnTimers::new(),
                notifier,
                locks: Mutex::new(HashMap::new()),
                settings,
            }),
        }
    }

    /// Service settings.
    pub fn settings(&self) -> &ServiceSettings {
        &self.inner.settings
    }

    /// Journals and subscribers of every tracked match.
    pub fn events(&self) -> &EventHub {
        &self.inner.events
    }

    /// Builds a mode config, filling unnamed word settings from the defaults.
    ///
    /// # Errors
    ///
    /// Unsupported word length, or word settings for another mode.
    pub fn mode_config(
        &self,
        mode: GameMode,
        length: Option<usize>,
        alphabet: Option<Alphabet>,
    ) -> Result<ModeConfig, ServiceError> {
        match mode {
            GameMode::Words => {
                let length = length
                    .map(WordLength::try_from)
                    .transpose()
                    .map_err(MatchError::from)?
                    .unwrap_or(self.inner.settings.default_word_length);
                Ok(ModeConfig::Words {
                    length,
                    alphabet: alphabet.unwrap_or(self.inner.settings.default_alphabet),
                })
            }
            _ if length.is_some() || alphabet.is_some() => Err(ServiceError::BadRequest(
                format!("{} mode takes no word settings", mode),
            )),
            GameMode::Numbers => Ok(ModeConfig::Numbers),
            GameMode::Battleship => Ok(ModeConfig::Battleship),
        }
    }

    // ───── Lobby ─────

    /// Opens a match in WAITING.
    ///
    /// # Errors
    ///
    /// Fails if the match cannot be stored.
    #[instrument(skip(self, config), fields(creator = %creator, mode = %config.mode.mode()))]
    pub async fn create_match(
        &self,
        creator: PlayerId,
        config: MatchConfig,
    ) -> Result<Match, ServiceError> {
        let game = Match::create(MatchId::generate(), creator, config);
        self.inner.store.insert(&game)?;
        info!(match_id = %game.id(), "Match opened");
        self.after_commit(game.clone(), Transition::Created).await;
        Ok(game)
    }

    /// Seats `opponent`, moving the match to SETUP.
    ///
    /// # Errors
    ///
    /// Rejected unless the match is WAITING and `opponent` is not its creator.
    #[instrument(skip(self), fields(match_id = %match_id, opponent = %opponent))]
    pub async fn join_match(
        &self,
        match_id: MatchId,
        opponent: PlayerId,
    ) -> Result<Match, ServiceError> {
        let ((), game) = self
            .commit(match_id, move |game| {
                game.join(opponent.clone())?;
                Ok(((), Transition::Joined { opponent }))
            })
            .await?;
        Ok(game)
    }

    // ───── Setup ─────

    /// Locks in a player's secret.
    ///
    /// # Errors
    ///
    /// Invalid secrets and commits outside SETUP are refused.
    #[instrument(skip(self, secret), fields(match_id = %match_id, player = %player))]
    pub async fn commit_secret(
        &self,
        match_id: MatchId,
        player: &PlayerId,
        secret: &str,
    ) -> Result<SetupProgress, ServiceError> {
        let (progress, _) = self
            .commit(match_id, |game| {
                let progress = game.commit_secret(player, secret)?;
                Ok((
                    progress,
                    Transition::SecretCommitted {
                        player: player.clone(),
                        progress,
                    },
                ))
            })
            .await?;
        Ok(progress)
    }

    /// Locks in a player's fleet.
    ///
    /// # Errors
    ///
    /// Illegal fleets and commits outside SETUP are refused.
    #[instrument(skip(self, ships), fields(match_id = %match_id, player = %player, ships = ships.len()))]
    pub async fn commit_fleet(
        &self,
        match_id: MatchId,
        player: &PlayerId,
        ships: Vec<Ship>,
    ) -> Result<SetupProgress, ServiceError> {
        let (progress, _) = self
            .commit(match_id, |game| {
                let progress = game.commit_fleet(player, ships)?;
                Ok((
                    progress,
                    Transition::FleetCommitted {
                        player: player.clone(),
                        progress,
                    },
                ))
            })
            .await?;
        Ok(progress)
    }

    // ───── Play ─────

    /// Evaluates a guess for the player holding the turn.
    ///
    /// # Errors
    ///
    /// Malformed guesses and out-of-turn moves are refused.
    #[instrument(skip(self, guess), fields(match_id = %match_id, player = %player))]
    pub async fn submit_guess(
        &self,
        match_id: MatchId,
        player: &PlayerId,
        guess: &str,
    ) -> Result<GuessOutcome, ServiceError> {
        let (outcome, _) = self
            .commit(match_id, |game| {
                let outcome = game.submit_guess(player, guess)?;
                Ok((
                    outcome.clone(),
                    Transition::Guessed {
                        player: player.clone(),
                        outcome,
                    },
                ))
            })
            .await?;
        Ok(outcome)
    }

    /// Fires at `target` for the player holding the turn.
    ///
    /// # Errors
    ///
    /// Repeated or off-grid targets and out-of-turn shots are refused.
    #[instrument(skip(self), fields(match_id = %match_id, player = %player, cell = %target))]
    pub async fn fire_shot(
        &self,
        match_id: MatchId,
        player: &PlayerId,
        target: Coord,
    ) -> Result<ShotOutcome, ServiceError> {
        let (outcome, _) = self
            .commit(match_id, |game| {
                let outcome = game.fire_shot(player, target)?;
                Ok((
                    outcome.clone(),
                    Transition::ShotFired {
                        player: player.clone(),
                        outcome,
                    },
                ))
            })
            .await?;
        Ok(outcome)
    }

    /// Passes the turn when a client reports that the turn timer ran out.
    ///
    /// The request names the version it observed. It is applied only if the
    /// match is still at that version and the authoritative deadline has
    /// passed. If no timer is armed, as after a restart, one is armed now
    /// and the request is refused.
    ///
    /// # Errors
    ///
    /// [`ServiceError::TurnNotExpired`] before the deadline, stale state if
    /// the match moved on.
    #[instrument(skip(self), fields(match_id = %match_id))]
    pub async fn forfeit_turn_on_timeout(
        &self,
        match_id: MatchId,
        observed_version: u64,
    ) -> Result<TurnForfeit, ServiceError> {
        let _guard = self.lock(match_id).await?;
        let game = self.load(match_id)?;
        let now = Instant::now();
        let current = observed_version == game.version();
        match self.inner.timers.deadline(match_id) {
            Some((armed, deadline)) if current && armed == observed_version && now < deadline => {
                warn!("Timeout requested before the deadline");
                return Err(not_expired(deadline - now));
            }
            None if current && game.status() == MatchStatus::Playing => {
                warn!("No turn timer armed, arming one");
                self.schedule_turn_timer(&game);
                return Err(not_expired(self.inner.settings.turn_duration));
            }
            _ => {}
        }
        let (forfeit, _) = self.apply(game, forfeit_action(observed_version)).await?;
        Ok(forfeit)
    }

    /// Arms a fresh turn timer for every match stored as PLAYING.
    ///
    /// Called once at startup, since timers do not survive a restart.
    /// Returns how many timers were armed.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot list matches.
    #[instrument(skip(self))]
    pub fn resume_turn_timers(&self) -> Result<usize, ServiceError> {
        let playing = self.inner.store.list_by_status(MatchStatus::Playing)?;
        for game in &playing {
            debug!(match_id = %game.id(), version = game.version(), "Re-arming turn timer");
            self.schedule_turn_timer(game);
        }
        info!(count = playing.len(), "Turn timers resumed");
        Ok(playing.len())
    }

    // ───── Observation ─────

    /// Streams every committed transition after `since`, in commit order.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for unknown matches.
    #[instrument(skip(self), fields(match_id = %match_id))]
    pub async fn subscribe(
        &self,
        match_id: MatchId,
        since: Option<u64>,
    ) -> Result<Subscription, ServiceError> {
        let _guard = self.lock(match_id).await?;
        let game = self.load(match_id)?;
        Ok(self.inner.events.subscribe(&game, since))
    }

    /// Current state of a match.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for unknown matches.
    pub fn get_match(&self, match_id: MatchId) -> Result<Match, ServiceError> {
        self.load(match_id)
    }

    /// Current state as `viewer` may see it.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for unknown matches.
    pub fn view(&self, match_id: MatchId, viewer: Option<&PlayerId>) -> Result<MatchView, ServiceError> {
        Ok(self.load(match_id)?.view_for(viewer))
    }

    /// Matches in `status`, oldest first.
    ///
    /// # Errors
    ///
    /// Fails if the store fails.
    #[instrument(skip(self))]
    pub fn matches_with_status(&self, status: MatchStatus) -> Result<Vec<Match>, ServiceError> {
        Ok(self.inner.store.list_by_status(status)?)
    }

    /// Open lobby: every match still waiting for an opponent.
    ///
    /// # Errors
    ///
    /// Fails if the store fails.
    pub fn waiting_matches(&self) -> Result<Vec<Match>, ServiceError> {
        self.matches_with_status(MatchStatus::Waiting)
    }

    /// Stored move log of a match.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for unknown matches.
    #[instrument(skip(self))]
    pub fn history(&self, match_id: MatchId) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.load(match_id)?;
        Ok(self.inner.store.history(match_id)?)
    }

    /// Time left on the match's turn timer, if one is armed.
    pub fn turn_time_left(&self, match_id: MatchId) -> Option<Duration> {
        self.inner
            .timers
            .deadline(match_id)
            .map(|(_, deadline)| deadline.saturating_duration_since(Instant::now()))
    }

    // ───── Commit pipeline ─────

    fn load(&self, match_id: MatchId) -> Result<Match, ServiceError> {
        self.inner
            .store
            .load(match_id)?
            .ok_or(ServiceError::NotFound(match_id))
    }

    async fn lock(&self, match_id: MatchId) -> Result<MatchLock<'_>, ServiceError> {
        let lock = {
            let mut locks = self
                .inner
                .locks
                .lock()
                .map_err(|e| StoreError::new(format!("Match lock table poisoned: {}", e)))?;
            Arc::clone(locks.entry(match_id).or_default())
        };
        Ok(MatchLock {
            table: &self.inner.locks,
            match_id,
            guard: Some(lock.lock_owned().await),
        })
    }

    async fn commit<T, F>(&self, match_id: MatchId, action: F) -> Result<(T, Match), ServiceError>
    where
        F: FnOnce(&mut Match) -> Result<(T, Transition), MatchError>,
    {
        let _guard = self.lock(match_id).await?;
        let game = self.load(match_id)?;
        self.apply(game, action).await
    }

    /// Applies `action` to `game` and commits it. The caller holds the lock.
    async fn apply<T, F>(&self, mut game: Match, action: F) -> Result<(T, Match), ServiceError>
    where
        F: FnOnce(&mut Match) -> Result<(T, Transition), MatchError>,
    {
        let expected = game.version();
        let (value, transition) = action(&mut game).inspect_err(|e| {
            warn!(match_id = %game.id(), code = e.code(), error = %e, "Action rejected");
        })?;
        self.inner.store.save(&game, expected)?;
        debug!(match_id = %game.id(), version = game.version(), "Transition saved");
        self.after_commit(game.clone(), transition).await;
        Ok((value, game))
    }

    async fn after_commit(&self, game: Match, transition: Transition) {
        self.schedule_turn_timer(&game);
        let event = self.inner.events.publish(MatchEvent::new(
            game.id(),
            game.version(),
            transition,
            game,
        ));
        self.inner.notifier.on_transition(&event).await;
    }

    fn schedule_turn_timer(&self, game: &Match) {
        if game.status() != MatchStatus::Playing {
            self.inner.timers.disarm(game.id());
            return;
        }
        let deadline = Instant::now() + self.inner.settings.turn_duration;
        self.inner.timers.arm(
            game.id(),
            game.version(),
            deadline,
            expire_turn(Arc::downgrade(&self.inner), game.id(), game.version()),
        );
    }
}

fn forfeit_action(
    observed_version: u64,
) -> impl FnOnce(&mut Match) -> Result<(TurnForfeit, Transition), MatchError> {
    move |game| {
        let forfeit = game.forfeit_turn(observed_version)?;
        Ok((forfeit.clone(), Transition::TurnForfeited { forfeit }))
    }
}

fn not_expired(remaining: Duration) -> ServiceError {
    ServiceError::TurnNotExpired {
        remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Timer task body: forfeits the turn armed at `version`.
fn expire_turn(inner: Weak<Inner>, match_id: MatchId, version: u64) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        inner.timers.release(match_id, version);
        let service = MatchService { inner };
        match service.commit(match_id, forfeit_action(version)).await {
            Ok((forfeit, _)) => info!(
                match_id = %match_id,
                forfeited_by = %forfeit.forfeited_by(),
                "Turn timer expired"
            ),
            Err(e) => debug!(match_id = %match_id, error = %e, "Turn timer expiry superseded"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn lock_entries(service: &MatchService) -> usize {
        service.inner.locks.lock().expect("lock table").len()
    }

    #[tokio::test]
    async fn idle_matches_leave_no_lock_entries() {
        let service = MatchService::new(Arc::new(MemoryStore::new()), ServiceSettings::default());
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");
        let id = service
            .create_match(alice.clone(), MatchConfig::new(ModeConfig::Numbers))
            .await
            .expect("create")
            .id();
        service.join_match(id, bob.clone()).await.expect("join");
        service.commit_secret(id, &alice, "5678").await.expect("secret");
        service.commit_secret(id, &bob, "1234").await.expect("secret");

        let (first, second) = tokio::join!(
            service.submit_guess(id, &alice, "1234"),
            service.submit_guess(id, &alice, "1234"),
        );
        assert!(first.is_ok() != second.is_ok());
        assert_eq!(service.get_match(id).expect("load").status(), MatchStatus::Finished);
        assert_eq!(lock_entries(&service), 0);

        let _ = service.submit_guess(id, &bob, "5678").await;
        assert_eq!(lock_entries(&service), 0);
    }
}
