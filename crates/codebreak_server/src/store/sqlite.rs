//! Diesel-backed SQLite store.

use codebreak_engine::{HistoryEntry, Match, MatchId, MatchStatus};
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use super::models::{MatchRow, MoveRow, version_column};
use super::{MatchStore, StoreError, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Store backed by a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migration failed: {}", e)))?;
        info!(path = %store.db_path, migrations = applied.len(), "Match store ready");
        Ok(store)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS)).execute(&mut conn)?;
        Ok(conn)
    }

    /// History entries of `game` not yet stored.
    ///
    /// The log is append-only, so the stored rows are a prefix of it.
    fn unsaved_moves<'a>(
        conn: &mut SqliteConnection,
        game: &'a Match,
    ) -> Result<&'a [HistoryEntry], StoreError> {
        use schema::match_moves::dsl;

        let stored: i64 = dsl::match_moves
            .filter(dsl::match_id.eq(game.id().to_string()))
            .count()
            .get_result(conn)?;
        let entries = game.history().entries();
        let stored = usize::try_from(stored).unwrap_or(usize::MAX).min(entries.len());
        Ok(&entries[stored..])
    }

    fn append_moves(conn: &mut SqliteConnection, game: &Match) -> Result<usize, StoreError> {
        let unsaved = Self::unsaved_moves(conn, game)?;
        let offset = game.history().len() - unsaved.len();
        let rows = unsaved
            .iter()
            .enumerate()
            .map(|(i, entry)| MoveRow::from_entry(game, offset + i, entry))
            .collect::<Result<Vec<_>, _>>()?;
        let mut inserted = 0;
        for row in &rows {
            inserted += diesel::insert_or_ignore_into(schema::match_moves::table)
                .values(row)
                .execute(conn)?;
        }
        Ok(inserted)
    }
}

impl MatchStore for SqliteStore {
    #[instrument(skip(self, game), fields(match_id = %game.id()))]
    fn insert(&self, game: &Match) -> Result<(), StoreError> {
        let row = MatchRow::from_match(game)?;
        let mut conn = self.connection()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(schema::matches::table)
                .values(&row)
                .execute(conn)?;
            Self::append_moves(conn, game)?;
            Ok(())
        })?;
        debug!("Match inserted");
        Ok(())
    }

    #[instrument(skip(self, game), fields(match_id = %game.id(), version = game.version()))]
    fn save(&self, game: &Match, expected_version: u64) -> Result<(), StoreError> {
        use schema::matches::dsl;

        let row = MatchRow::from_match(game)?;
        let expected = version_column(expected_version)?;
        let mut conn = self.connection()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let updated = diesel::update(
                dsl::matches
                    .filter(dsl::id.eq(row.id()))
                    .filter(dsl::version.eq(expected)),
            )
            .set((
                dsl::opponent_id.eq(row.opponent_id()),
                dsl::status.eq(row.status()),
                dsl::version.eq(*row.version()),
                dsl::turn_count.eq(*row.turn_count()),
                dsl::winner_id.eq(row.winner_id()),
                dsl::state_json.eq(row.state_json()),
                dsl::updated_at.eq(*row.updated_at()),
            ))
            .execute(conn)?;
            if updated == 0 {
                warn!(expected_version, "Optimistic save lost the race");
                return Err(StoreError::conflict(format!(
                    "Match {} is no longer at version {}",
                    game.id(),
                    expected_version
                )));
            }
            let appended = Self::append_moves(conn, game)?;
            debug!(appended, "Match saved");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn load(&self, id: MatchId) -> Result<Option<Match>, StoreError> {
        let mut conn = self.connection()?;
        schema::matches::table
            .find(id.to_string())
            .select(MatchRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(MatchRow::into_match)
            .transpose()
    }

    #[instrument(skip(self))]
    fn list_by_status(&self, status: MatchStatus) -> Result<Vec<Match>, StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        let rows = dsl::matches
            .filter(dsl::status.eq(status.to_string()))
            .order(dsl::created_at.asc())
            .select(MatchRow::as_select())
            .load(&mut conn)?;
        debug!(count = rows.len(), "Listed matches");
        rows.into_iter().map(MatchRow::into_match).collect()
    }

    #[instrument(skip(self))]
    fn history(&self, id: MatchId) -> Result<Vec<HistoryEntry>, StoreError> {
        use schema::match_moves::dsl;

        let mut conn = self.connection()?;
        let rows = dsl::match_moves
            .filter(dsl::match_id.eq(id.to_string()))
            .order(dsl::seq.asc())
            .select(MoveRow::as_select())
            .load(&mut conn)?;
        rows.into_iter().map(MoveRow::into_entry).collect()
    }
}
