//! In-process store for tests and ephemeral servers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use codebreak_engine::{HistoryEntry, Match, MatchId, MatchStatus};
use tracing::{debug, instrument};

use super::{MatchStore, StoreError};

/// Matches held in a map. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    matches: Mutex<HashMap<MatchId, Match>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<MatchId, Match>>, StoreError> {
        self.matches
            .lock()
            .map_err(|e| StoreError::new(format!("Store lock poisoned: {}", e)))
    }
}

impl MatchStore for MemoryStore {
    #[instrument(skip(self, game), fields(match_id = %game.id()))]
    fn insert(&self, game: &Match) -> Result<(), StoreError> {
        let mut matches = self.lock()?;
        if matches.contains_key(&game.id()) {
            return Err(StoreError::new(format!("Match {} already exists", game.id())));
        }
        matches.insert(game.id(), game.clone());
        debug!("Match inserted");
        Ok(())
    }

    #[instrument(skip(self, game), fields(match_id = %game.id(), version = game.version()))]
    fn save(&self, game: &Match, expected_version: u64) -> Result<(), StoreError> {
        let mut matches = self.lock()?;
        let stored = matches
            .get_mut(&game.id())
            .ok_or_else(|| StoreError::new(format!("Match {} not found", game.id())))?;
        if stored.version() != expected_version {
            return Err(StoreError::conflict(format!(
                "Match {} is at version {}, expected {}",
                game.id(),
                stored.version(),
                expected_version
            )));
        }
        *stored = game.clone();
        debug!("Match saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load(&self, id: MatchId) -> Result<Option<Match>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    #[instrument(skip(self))]
    fn list_by_status(&self, status: MatchStatus) -> Result<Vec<Match>, StoreError> {
        let mut found: Vec<Match> = self
            .lock()?
            .values()
            .filter(|game| game.status() == status)
            .cloned()
            .collect();
        found.sort_by_key(|game| game.created_at());
        Ok(found)
    }

    #[instrument(skip(self))]
    fn history(&self, id: MatchId) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .lock()?
            .get(&id)
            .map(|game| game.history().entries().to_vec())
            .unwrap_or_default())
    }
}
