//! SQLite store tests against a temporary database file.

use std::sync::Arc;

use codebreak_engine::{Match, MatchConfig, MatchId, MatchStatus, ModeConfig, PlayerId};
use codebreak_server::{MatchService, MatchStore, ServiceSettings, SqliteStore};
use tempfile::NamedTempFile;

/// Creates a migrated store in a temporary file.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_file
        .path()
        .to_str()
        .expect("Invalid path")
        .to_string();
    let store = SqliteStore::open(&db_path).expect("Failed to open store");
    (temp_file, store)
}

fn numbers_match() -> Match {
    Match::create(
        MatchId::generate(),
        PlayerId::new("alice"),
        MatchConfig::new(ModeConfig::Numbers).with_title("Friday"),
    )
}

fn playing(mut game: Match) -> Match {
    game.join(PlayerId::new("bob")).expect("join");
    game.commit_secret(&PlayerId::new("alice"), "5678").expect("secret");
    game.commit_secret(&PlayerId::new("bob"), "1234").expect("secret");
    game
}

#[test]
fn inserted_match_loads_back_unchanged() {
    let (_temp, store) = setup_test_db();
    let game = numbers_match();
    store.insert(&game).expect("insert");

    let loaded = store.load(game.id()).expect("load").expect("present");
    assert_eq!(loaded, game);
    assert_eq!(loaded.title(), Some("Friday"));
    assert!(store.load(MatchId::generate()).expect("load").is_none());
}

#[test]
fn save_requires_the_expected_version() {
    let (_temp, store) = setup_test_db();
    let game = numbers_match();
    store.insert(&game).expect("insert");

    let mut joined = game.clone();
    joined.join(PlayerId::new("bob")).expect("join");
    store.save(&joined, game.version()).expect("save");

    let mut rival = game.clone();
    rival.join(PlayerId::new("carol")).expect("join");
    let err = store.save(&rival, game.version()).unwrap_err();
    assert!(err.is_conflict());

    let stored = store.load(game.id()).expect("load").expect("present");
    assert_eq!(stored.opponent(), Some(&PlayerId::new("bob")));
}

#[test]
fn moves_are_appended_once() {
    let (_temp, store) = setup_test_db();
    let game = numbers_match();
    store.insert(&game).expect("insert");
    let mut game = playing(game);
    store.save(&game, 0).expect("save setup");

    let expected = game.version();
    game.submit_guess(&PlayerId::new("alice"), "1200").expect("guess");
    store.save(&game, expected).expect("save guess");
    // Saving the same state again re-offers every entry.
    store.save(&game, game.version()).expect("save again");

    let history = store.history(game.id()).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history.as_slice(), game.history().entries());
}

#[test]
fn matches_are_listed_by_status() {
    let (_temp, store) = setup_test_db();
    let waiting = numbers_match();
    store.insert(&waiting).expect("insert");
    let other = numbers_match();
    store.insert(&other).expect("insert");
    store.save(&playing(other.clone()), other.version()).expect("save");

    let listed = store.list_by_status(MatchStatus::Waiting).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), waiting.id());
    assert_eq!(store.list_by_status(MatchStatus::Playing).expect("list").len(), 1);
}

#[test]
fn reopening_keeps_existing_matches() {
    let (temp, store) = setup_test_db();
    let game = numbers_match();
    store.insert(&game).expect("insert");

    let path = temp.path().to_str().expect("Invalid path");
    let reopened = SqliteStore::open(path).expect("reopen");
    assert_eq!(reopened.load(game.id()).expect("load"), Some(game));
}

#[tokio::test]
async fn service_persists_a_full_match() {
    let (_temp, store) = setup_test_db();
    let store = Arc::new(store);
    let service = MatchService::new(store.clone(), ServiceSettings::default());
    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");

    let id = service
        .create_match(alice.clone(), MatchConfig::new(ModeConfig::words()))
        .await
        .expect("create")
        .id();
    service.join_match(id, bob.clone()).await.expect("join");
    service.commit_secret(id, &alice, "ракета").await.unwrap_err();
    service.commit_secret(id, &alice, "лампа").await.expect("secret");
    service.commit_secret(id, &bob, "книга").await.expect("secret");
    service.submit_guess(id, &alice, "КНИГИ").await.expect("guess");
    service.submit_guess(id, &bob, "ЛАМПА").await.expect("guess");

    let stored = store.load(id).expect("load").expect("present");
    assert_eq!(stored.status(), MatchStatus::Finished);
    assert_eq!(stored.winner(), Some(&bob));
    assert_eq!(service.history(id).expect("history").len(), 2);
}
