//! REST and Server-Sent Events surface over [`MatchService`].

use std::convert::Infallible;
use std::str::FromStr;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use codebreak_engine::{
    Alphabet, Coord, GameMode, GuessOutcome, HistoryEntry, MatchConfig, MatchId, MatchStatus,
    MatchView, PlayerId, SetupProgress, Ship, ShotOutcome, TurnForfeit,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

use crate::error::ServiceError;
use crate::events::Transition;
use crate::service::MatchService;

/// Body of `POST /matches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    /// Creating player.
    pub creator_id: PlayerId,
    /// `numbers`, `words` or `battleship`.
    pub mode: String,
    /// Word length, words mode only.
    #[serde(default)]
    pub length: Option<usize>,
    /// Alphabet, words mode only.
    #[serde(default)]
    pub alphabet: Option<Alphabet>,
    /// Lobby title.
    #[serde(default)]
    pub title: Option<String>,
    /// Prize text.
    #[serde(default)]
    pub prize: Option<String>,
}

/// Body naming the acting player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRequest {
    /// Acting player.
    pub player_id: PlayerId,
}

/// Body of `POST /matches/{id}/secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRequest {
    /// Committing player.
    pub player_id: PlayerId,
    /// Raw secret text.
    pub secret: String,
}

/// Body of `POST /matches/{id}/fleet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetRequest {
    /// Committing player.
    pub player_id: PlayerId,
    /// All five ships, placed.
    pub ships: Vec<Ship>,
}

/// Body of `POST /matches/{id}/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Guessing player.
    pub player_id: PlayerId,
    /// Raw guess text.
    pub guess: String,
}

/// Body of `POST /matches/{id}/shot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotRequest {
    /// Shooting player.
    pub player_id: PlayerId,
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

/// Body of `POST /matches/{id}/timeout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutRequest {
    /// Match version the client's timer was started at.
    pub observed_version: u64,
}

/// Response to a secret or fleet commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    /// Setup state after the commit.
    pub progress: SetupProgress,
}

#[derive(Debug, Deserialize)]
struct ViewerQuery {
    player_id: Option<PlayerId>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    since: Option<u64>,
    player_id: Option<PlayerId>,
}

#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    version: u64,
    transition: &'a Transition,
    view: MatchView,
}

/// Routes for the match API.
pub fn router(service: MatchService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/matches", post(create_match).get(list_matches))
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/join", post(join_match))
        .route("/matches/{id}/secret", post(commit_secret))
        .route("/matches/{id}/fleet", post(commit_fleet))
        .route("/matches/{id}/guess", post(submit_guess))
        .route("/matches/{id}/shot", post(fire_shot))
        .route("/matches/{id}/timeout", post(forfeit_turn))
        .route("/matches/{id}/history", get(history))
        .route("/matches/{id}/events", get(events))
        .layer(ServiceBuilder::new().map_request(|req: Request| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(service)
}

/// Serves the match API on `listener` until the process stops.
///
/// # Errors
///
/// Returns the listener's I/O error.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, service: MatchService) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Match server listening");
    }
    axum::serve(listener, router(service)).await
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(service, request), fields(creator = %request.creator_id))]
async fn create_match(
    State(service): State<MatchService>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), ServiceError> {
    let mode = GameMode::from_str(&request.mode)
        .map_err(|_| ServiceError::BadRequest(format!("Unknown mode '{}'", request.mode)))?;
    let mut config = MatchConfig::new(service.mode_config(mode, request.length, request.alphabet)?);
    config.title = request.title;
    config.prize = request.prize;
    let game = service.create_match(request.creator_id.clone(), config).await?;
    Ok((
        StatusCode::CREATED,
        Json(game.view_for(Some(&request.creator_id))),
    ))
}

#[instrument(skip(service))]
async fn list_matches(
    State(service): State<MatchService>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MatchView>>, ServiceError> {
    let status = match query.status.as_deref() {
        Some(raw) => MatchStatus::from_str(raw)
            .map_err(|_| ServiceError::BadRequest(format!("Unknown status '{}'", raw)))?,
        None => MatchStatus::Waiting,
    };
    let matches = service.matches_with_status(status)?;
    Ok(Json(matches.iter().map(|game| game.view_for(None)).collect()))
}

#[instrument(skip(service))]
async fn get_match(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<MatchView>, ServiceError> {
    Ok(Json(service.view(id, query.player_id.as_ref())?))
}

#[instrument(skip(service))]
async fn join_match(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<MatchView>, ServiceError> {
    let game = service.join_match(id, request.player_id.clone()).await?;
    Ok(Json(game.view_for(Some(&request.player_id))))
}

#[instrument(skip(service, request), fields(player = %request.player_id))]
async fn commit_secret(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<SecretRequest>,
) -> Result<Json<CommitResponse>, ServiceError> {
    let progress = service
        .commit_secret(id, &request.player_id, &request.secret)
        .await?;
    Ok(Json(CommitResponse { progress }))
}

#[instrument(skip(service, request), fields(player = %request.player_id))]
async fn commit_fleet(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<FleetRequest>,
) -> Result<Json<CommitResponse>, ServiceError> {
    let progress = service
        .commit_fleet(id, &request.player_id, request.ships)
        .await?;
    Ok(Json(CommitResponse { progress }))
}

#[instrument(skip(service, request), fields(player = %request.player_id))]
async fn submit_guess(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessOutcome>, ServiceError> {
    Ok(Json(
        service
            .submit_guess(id, &request.player_id, &request.guess)
            .await?,
    ))
}

#[instrument(skip(service, request), fields(player = %request.player_id))]
async fn fire_shot(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<ShotRequest>,
) -> Result<Json<ShotOutcome>, ServiceError> {
    let target = Coord::new(request.row, request.col);
    Ok(Json(service.fire_shot(id, &request.player_id, target).await?))
}

#[instrument(skip(service))]
async fn forfeit_turn(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Json(request): Json<TimeoutRequest>,
) -> Result<Json<TurnForfeit>, ServiceError> {
    Ok(Json(
        service
            .forfeit_turn_on_timeout(id, request.observed_version)
            .await?,
    ))
}

#[instrument(skip(service))]
async fn history(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
) -> Result<Json<Vec<HistoryEntry>>, ServiceError> {
    Ok(Json(service.history(id)?))
}

#[instrument(skip(service))]
async fn events(
    State(service): State<MatchService>,
    Path(id): Path<MatchId>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServiceError> {
    let subscription = service.subscribe(id, query.since).await?;
    let viewer = query.player_id;
    let stream = subscription.into_stream().filter_map(move |event| {
        let payload = EventPayload {
            version: *event.version(),
            transition: event.transition(),
            view: event.snapshot().view_for(viewer.as_ref()),
        };
        let sse = Event::default()
            .event(event.transition().kind())
            .id(event.version().to_string())
            .json_data(&payload);
        futures::future::ready(match sse {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                warn!(error = %e, "Failed to encode event");
                None
            }
        })
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
