//! Durable match storage.
//!
//! Saving is optimistic: a write names the version it was derived from and
//! fails with [`StoreErrorKind::VersionConflict`] if another write landed
//! first.

mod error;
mod memory;
mod models;
mod schema;
mod sqlite;

pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStore;
pub use models::{MatchRow, MoveRow};
pub use sqlite::SqliteStore;

use codebreak_engine::{HistoryEntry, Match, MatchId, MatchStatus};

/// Persistence boundary for matches and their move log.
pub trait MatchStore: Send + Sync + std::fmt::Debug {
    /// Stores a freshly created match.
    ///
    /// # Errors
    ///
    /// Fails if the id already exists or the backend fails.
    fn insert(&self, game: &Match) -> Result<(), StoreError>;

    /// Replaces the stored match if it is still at `expected_version`, and
    /// appends any history entries not yet stored.
    ///
    /// # Errors
    ///
    /// [`StoreErrorKind::VersionConflict`] if the stored version differs.
    fn save(&self, game: &Match, expected_version: u64) -> Result<(), StoreError>;

    /// Loads a match, `None` if unknown.
    ///
    /// # Errors
    ///
    /// Fails if the backend fails or the stored state cannot be decoded.
    fn load(&self, id: MatchId) -> Result<Option<Match>, StoreError>;

    /// All matches in `status`, oldest first.
    ///
    /// # Errors
    ///
    /// Fails if the backend fails.
    fn list_by_status(&self, status: MatchStatus) -> Result<Vec<Match>, StoreError>;

    /// Stored move log of a match, in submission order.
    ///
    /// # Errors
    ///
    /// Fails if the backend fails.
    fn history(&self, id: MatchId) -> Result<Vec<HistoryEntry>, StoreError>;
}
