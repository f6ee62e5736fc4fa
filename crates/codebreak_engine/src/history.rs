//! Append-only turn history.
//!
//! Entries keep submission order. Appending an entry whose id is already
//! present is a no-op, so redelivered moves never duplicate.

use crate::battleship::Shot;
use crate::guess::ResultLabel;
use crate::identity::{EntryId, PlayerId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A guess as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GuessRecord {
    /// Canonical guess text.
    guess: String,
    /// Summary shown to players.
    label: ResultLabel,
    /// Positions revealed for the first time.
    newly_revealed: usize,
}

/// What a history entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveRecord {
    /// A code guess.
    Guess(GuessRecord),
    /// A battleship shot.
    Shot(Shot),
}

/// One accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct HistoryEntry {
    /// Unique entry id.
    id: EntryId,
    /// Player who moved.
    player: PlayerId,
    /// Turn counter when the move was made.
    turn: u32,
    /// The move itself.
    record: MoveRecord,
    /// When the move was accepted.
    recorded_at: DateTime<Utc>,
}

/// Ordered, append-only move log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLog {
    entries: Vec<HistoryEntry>,
}

impl TurnLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` unless an entry with the same id exists.
    ///
    /// Returns whether the entry was added.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id()))]
    pub fn append(&mut self, entry: HistoryEntry) -> bool {
        if self.contains(entry.id()) {
            debug!("Duplicate history entry ignored");
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Appends every entry not already present, returning how many were added.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = HistoryEntry>) -> usize {
        entries
            .into_iter()
            .map(|entry| self.append(entry))
            .filter(|added| *added)
            .count()
    }

    /// Whether an entry with `id` exists.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// Entries in submission order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries submitted by `player`.
    pub fn by_player<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.player() == player)
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess_entry(player: &str, guess: &str) -> HistoryEntry {
        HistoryEntry::new(
            EntryId::generate(),
            PlayerId::new(player),
            0,
            MoveRecord::Guess(GuessRecord::new(guess.to_string(), ResultLabel::NoMatches, 0)),
            Utc::now(),
        )
    }

    #[test]
    fn append_keeps_submission_order() {
        let mut log = TurnLog::new();
        log.append(guess_entry("alice", "1111"));
        log.append(guess_entry("bob", "2222"));
        let guesses: Vec<&PlayerId> = log.entries().iter().map(HistoryEntry::player).collect();
        assert_eq!(guesses, vec![&PlayerId::new("alice"), &PlayerId::new("bob")]);
    }

    #[test]
    fn duplicate_id_is_ignored() {
        let mut log = TurnLog::new();
        let entry = guess_entry("alice", "1111");
        assert!(log.append(entry.clone()));
        assert!(!log.append(entry.clone()));
        assert_eq!(log.extend(vec![entry, guess_entry("bob", "2222")]), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn by_player_filters_entries() {
        let mut log = TurnLog::new();
        log.append(guess_entry("alice", "1111"));
        log.append(guess_entry("bob", "2222"));
        log.append(guess_entry("alice", "3333"));
        let alice = PlayerId::new("alice");
        assert_eq!(log.by_player(&alice).count(), 2);
    }
}
