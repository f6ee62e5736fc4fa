//! Row models for the `matches` and `match_moves` tables.

use chrono::NaiveDateTime;
use codebreak_engine::{HistoryEntry, Match, MoveRecord};
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;

use super::{StoreError, schema};

/// One match, with its full state serialized alongside indexed columns.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchRow {
    id: String,
    creator_id: String,
    opponent_id: Option<String>,
    mode: String,
    status: String,
    version: i64,
    turn_count: i32,
    winner_id: Option<String>,
    state_json: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl MatchRow {
    /// Flattens a match into a row.
    #[instrument(skip(game), fields(match_id = %game.id(), version = game.version()))]
    pub fn from_match(game: &Match) -> Result<Self, StoreError> {
        Ok(Self {
            id: game.id().to_string(),
            creator_id: game.creator().to_string(),
            opponent_id: game.opponent().map(ToString::to_string),
            mode: game.mode().to_string(),
            status: game.status().to_string(),
            version: version_column(game.version())?,
            turn_count: i32::try_from(game.turn_count())
                .map_err(|e| StoreError::new(format!("Turn count out of range: {}", e)))?,
            winner_id: game.winner().map(ToString::to_string),
            state_json: serde_json::to_string(game)?,
            created_at: game.created_at().naive_utc(),
            updated_at: game.updated_at().naive_utc(),
        })
    }

    /// Restores the match from its serialized state.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn into_match(self) -> Result<Match, StoreError> {
        Ok(serde_json::from_str(&self.state_json)?)
    }
}

/// One accepted move, append-only.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::match_moves)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MoveRow {
    id: String,
    match_id: String,
    seq: i32,
    player_id: String,
    kind: String,
    payload: String,
    result: String,
    revealed_count: i32,
    created_at: NaiveDateTime,
}

impl MoveRow {
    /// Row for the `seq`-th history entry of `game`.
    pub fn from_entry(game: &Match, seq: usize, entry: &HistoryEntry) -> Result<Self, StoreError> {
        let (kind, result, revealed_count) = match entry.record() {
            MoveRecord::Guess(guess) => (
                "guess",
                guess.label().to_string(),
                i32::try_from(*guess.newly_revealed()).unwrap_or(i32::MAX),
            ),
            MoveRecord::Shot(shot) => ("shot", shot.result.to_string(), 0),
        };
        Ok(Self {
            id: entry.id().to_string(),
            match_id: game.id().to_string(),
            seq: i32::try_from(seq)
                .map_err(|e| StoreError::new(format!("Move sequence out of range: {}", e)))?,
            player_id: entry.player().to_string(),
            kind: kind.to_string(),
            payload: serde_json::to_string(entry)?,
            result,
            revealed_count,
            created_at: entry.recorded_at().naive_utc(),
        })
    }

    /// Restores the history entry.
    pub fn into_entry(self) -> Result<HistoryEntry, StoreError> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// Versions are stored as SQLite integers.
pub fn version_column(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|e| StoreError::new(format!("Version out of range: {}", e)))
}
