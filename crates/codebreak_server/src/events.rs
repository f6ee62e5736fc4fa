//! Ordered push delivery of committed transitions.
//!
//! Every committed mutation is journaled per match and fanned out to live
//! subscribers. A new subscriber first receives every journaled event after
//! the version it already knows, then live events, all in commit order.
//! Journals are bounded; a snapshot covers whatever has fallen out.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use codebreak_engine::{
    GuessOutcome, Match, MatchId, MatchStatus, PlayerId, SetupProgress, ShotOutcome, TurnForfeit,
};
use derive_getters::Getters;
use derive_new::new;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// What a committed mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// The match was opened.
    Created,
    /// An opponent took the second seat.
    Joined {
        /// The new opponent.
        opponent: PlayerId,
    },
    /// A player locked in a secret.
    SecretCommitted {
        /// Committing player.
        player: PlayerId,
        /// Setup state afterwards.
        progress: SetupProgress,
    },
    /// A player locked in a fleet.
    FleetCommitted {
        /// Committing player.
        player: PlayerId,
        /// Setup state afterwards.
        progress: SetupProgress,
    },
    /// A guess was evaluated.
    Guessed {
        /// Guessing player.
        player: PlayerId,
        /// Evaluation and turn effects.
        outcome: GuessOutcome,
    },
    /// A shot was resolved.
    ShotFired {
        /// Shooting player.
        player: PlayerId,
        /// Result and turn effects.
        outcome: ShotOutcome,
    },
    /// The turn timer ran out.
    TurnForfeited {
        /// Who lost the turn.
        forfeit: TurnForfeit,
    },
    /// Current state, sent when the journal cannot cover the gap.
    Snapshot,
}

impl Transition {
    /// Short name used for logs and SSE event types.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Joined { .. } => "joined",
            Self::SecretCommitted { .. } => "secret_committed",
            Self::FleetCommitted { .. } => "fleet_committed",
            Self::Guessed { .. } => "guessed",
            Self::ShotFired { .. } => "shot_fired",
            Self::TurnForfeited { .. } => "turn_forfeited",
            Self::Snapshot => "snapshot",
        }
    }
}

/// One committed transition with the state it produced.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct MatchEvent {
    /// Match the event belongs to.
    match_id: MatchId,
    /// Match version after the transition.
    version: u64,
    /// What happened.
    transition: Transition,
    /// Full state after the transition.
    snapshot: Match,
}

/// Events kept per match for replay.
pub const JOURNAL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Channel {
    journal: VecDeque<Arc<MatchEvent>>,
    subscribers: Vec<mpsc::UnboundedSender<Arc<MatchEvent>>>,
}

/// Per-match journals and subscriber lists.
///
/// Each journal holds at most its capacity of recent events. A finished
/// match's channel is dropped once its final event is delivered, which also
/// ends every open subscription.
#[derive(Debug)]
pub struct EventHub {
    channels: Mutex<HashMap<MatchId, Channel>>,
    capacity: usize,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::with_capacity(JOURNAL_CAPACITY)
    }
}

impl EventHub {
    /// An empty hub keeping [`JOURNAL_CAPACITY`] events per match.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty hub keeping `capacity` events per match, at least one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Journals `event` and delivers it to every live subscriber.
    ///
    /// Subscribers whose receiver is gone are dropped. When the event
    /// finishes the match, the channel is released after delivery.
    #[instrument(skip(self, event), fields(match_id = %event.match_id, version = event.version))]
    pub fn publish(&self, event: MatchEvent) -> Arc<MatchEvent> {
        let event = Arc::new(event);
        let Ok(mut channels) = self.channels.lock() else {
            warn!("Event hub lock poisoned, event not delivered");
            return event;
        };
        let channel = channels.entry(event.match_id).or_default();
        channel
            .subscribers
            .retain(|sender| sender.send(Arc::clone(&event)).is_ok());
        debug!(subscribers = channel.subscribers.len(), "Event published");

        if event.snapshot.status() == MatchStatus::Finished {
            channels.remove(&event.match_id);
            debug!("Match finished, channel released");
            return event;
        }
        if channel.journal.len() == self.capacity {
            channel.journal.pop_front();
        }
        channel.journal.push_back(Arc::clone(&event));
        event
    }

    /// Subscribes to `current`'s match, replaying everything after `since`.
    ///
    /// `since` is the last version the caller has applied; `None` asks for
    /// the match from its creation. If the journal no longer reaches back to
    /// `since`, or does not reach `current`'s version as after a restart, a
    /// single [`Transition::Snapshot`] of `current` stands in for the missing
    /// events. A finished match gets its catch-up and a closed stream.
    #[instrument(skip(self, current), fields(match_id = %current.id(), version = current.version()))]
    pub fn subscribe(&self, current: &Match, since: Option<u64>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let match_id = current.id();
        let Ok(mut channels) = self.channels.lock() else {
            warn!("Event hub lock poisoned, subscription closed");
            return Subscription { match_id, receiver };
        };

        let wanted = since.map_or(0, |seen| seen + 1);
        if wanted <= current.version() {
            let journal = channels.get(&match_id).map(|channel| &channel.journal);
            let reaches_back = journal
                .and_then(|journal| journal.front())
                .is_some_and(|first| first.version <= wanted);
            let mut delivered = None;
            if let Some(journal) = journal.filter(|_| reaches_back) {
                for event in journal.iter().filter(|event| event.version >= wanted) {
                    // Receiver is held locally, so sends cannot fail here.
                    let _ = sender.send(Arc::clone(event));
                    delivered = Some(event.version);
                }
            }
            if delivered.is_none_or(|version| version < current.version()) {
                debug!(?since, reaches_back, "Journal gap, sending snapshot");
                let _ = sender.send(Arc::new(MatchEvent::new(
                    match_id,
                    current.version(),
                    Transition::Snapshot,
                    current.clone(),
                )));
            }
        }

        if current.status() == MatchStatus::Finished {
            debug!(?since, "Match finished, subscription closed after catch-up");
            return Subscription { match_id, receiver };
        }
        let channel = channels.entry(match_id).or_default();
        channel.subscribers.push(sender);
        debug!(?since, subscribers = channel.subscribers.len(), "Subscribed");
        Subscription { match_id, receiver }
    }

    /// Live subscribers of a match.
    pub fn subscriber_count(&self, match_id: MatchId) -> usize {
        self.channels
            .lock()
            .map(|channels| {
                channels
                    .get(&match_id)
                    .map_or(0, |channel| {
                        channel.subscribers.iter().filter(|s| !s.is_closed()).count()
                    })
            })
            .unwrap_or(0)
    }

    /// Events currently journaled for a match.
    pub fn journal_len(&self, match_id: MatchId) -> usize {
        self.channels
            .lock()
            .map(|channels| channels.get(&match_id).map_or(0, |channel| channel.journal.len()))
            .unwrap_or(0)
    }

    /// Whether the hub holds a channel for a match.
    pub fn is_tracking(&self, match_id: MatchId) -> bool {
        self.channels
            .lock()
            .map(|channels| channels.contains_key(&match_id))
            .unwrap_or(false)
    }
}

/// A stream of one match's transitions, in commit order.
///
/// Dropping it releases the channel.
#[derive(Debug)]
pub struct Subscription {
    match_id: MatchId,
    receiver: mpsc::UnboundedReceiver<Arc<MatchEvent>>,
}

impl Subscription {
    /// The watched match.
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Waits for the next transition. `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Arc<MatchEvent>> {
        self.receiver.recv().await
    }

    /// The next transition if one is already queued.
    pub fn try_next(&mut self) -> Option<Arc<MatchEvent>> {
        self.receiver.try_recv().ok()
    }

    /// Stops delivery and releases the channel.
    #[instrument(skip(self), fields(match_id = %self.match_id))]
    pub fn unsubscribe(mut self) {
        self.receiver.close();
        debug!("Unsubscribed");
    }

    /// Adapts the subscription into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Arc<MatchEvent>> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .receiver
                .recv()
                .await
                .map(|event| (event, subscription))
        })
    }
}
