//! Automated bot-versus-bot match through the full service stack.

use std::sync::Arc;

use anyhow::{Context, Result};
use codebreak_engine::{
    GameMode, MatchConfig, MatchStatus, PlayerId, RandomOpponent, SecretSpec,
};
use codebreak_server::{MatchService, MemoryStore, ServiceSettings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument};

/// Plays one match to completion or until `max_moves`.
#[instrument]
pub async fn run(mode: GameMode, seed: u64, max_moves: u32) -> Result<()> {
    let service = MatchService::new(Arc::new(MemoryStore::new()), ServiceSettings::default());
    let mut bot = RandomOpponent::new(StdRng::seed_from_u64(seed));
    let first = PlayerId::new("bot-1");
    let second = PlayerId::new("bot-2");

    let config = MatchConfig::new(service.mode_config(mode, None, None)?)
        .with_title(format!("{} simulation", mode));
    let game = service.create_match(first.clone(), config).await?;
    let id = game.id();
    service.join_match(id, second.clone()).await?;

    let spec: Option<SecretSpec> = game.mode_config().secret_spec();
    for player in [&first, &second] {
        match spec {
            Some(spec) => {
                let secret = bot.secret(spec);
                info!(player = %player, secret = %secret.as_str(), "Secret chosen");
                service.commit_secret(id, player, secret.as_str()).await?;
            }
            None => {
                let fleet = bot.fleet();
                service.commit_fleet(id, player, fleet.ships().to_vec()).await?;
                info!(player = %player, "Fleet deployed");
            }
        }
    }

    for _ in 0..max_moves {
        let game = service.get_match(id)?;
        if game.status() != MatchStatus::Playing {
            break;
        }
        let player = game.current_turn().cloned().context("playing match has a turn")?;
        let side = game.side_of(&player).context("turn holder is seated")?;
        match spec {
            Some(spec) => {
                let known = game.revealed_characters(side.other()).unwrap_or_default();
                let guess = bot.guess(spec, &known);
                let outcome = service.submit_guess(id, &player, &guess).await?;
                info!(
                    player = %player,
                    guess = %guess,
                    result = %outcome.evaluation().label(),
                    "Guess"
                );
            }
            None => {
                let Some(target) = bot.shot(game.shots(side)) else {
                    break;
                };
                let outcome = service.fire_shot(id, &player, target).await?;
                info!(
                    player = %player,
                    cell = %target.label(),
                    result = %outcome.shot().result,
                    "Shot"
                );
            }
        }
    }

    let game = service.get_match(id)?;
    info!(
        status = %game.status(),
        winner = ?game.winner().map(PlayerId::as_str),
        turns = game.turn_count(),
        moves = game.history().len(),
        "Simulation finished"
    );
    Ok(())
}
