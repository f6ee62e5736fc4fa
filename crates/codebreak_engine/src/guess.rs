//! Positional guess evaluation.
//!
//! Only exact position matches count. There is no credit for a right
//! character in the wrong place.

use crate::secret::{RevealedMask, Secret, SecretSpec, canonicalize};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Summary shown to both players after a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum ResultLabel {
    /// The guess equals the secret.
    #[display("ВЕРНО!")]
    Win,
    /// This many positions were revealed for the first time.
    #[display("ОТКРЫТО: {}", _0)]
    Revealed(usize),
    /// Nothing new was revealed.
    #[display("НЕТ СОВПАДЕНИЙ")]
    NoMatches,
}

/// Error raised when a guess cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GuessError {
    /// The guess length differs from the secret length.
    #[display("Guess must be {} characters long, got {}", expected, actual)]
    InvalidLength {
        /// Secret length.
        expected: usize,
        /// Submitted length.
        actual: usize,
    },

    /// A character is outside the mode's charset.
    #[display("Character '{}' at position {} cannot appear in a guess", character, position)]
    InvalidCharacter {
        /// Offending character (canonical form).
        character: char,
        /// Zero-based position.
        position: usize,
    },
}

impl std::error::Error for GuessError {}

/// Result of evaluating one guess against one secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Evaluation {
    /// Canonical guess text.
    guess: String,
    /// Mask after this guess.
    new_mask: RevealedMask,
    /// Positions revealed for the first time, ascending.
    newly_revealed: Vec<usize>,
    /// Whether the guess equals the secret.
    is_win: bool,
    /// Human-readable summary.
    label: ResultLabel,
}

impl Evaluation {
    /// Number of positions revealed for the first time. Zero on a win.
    pub fn newly_revealed_count(&self) -> usize {
        self.newly_revealed.len()
    }
}

/// Canonicalizes and checks a guess against the match's secret spec.
///
/// # Errors
///
/// Returns [`GuessError`] on length or charset mismatch.
#[instrument(skip(raw))]
pub(crate) fn validate_guess(raw: &str, spec: SecretSpec) -> Result<String, GuessError> {
    let canonical = canonicalize(raw);
    let actual = canonical.chars().count();
    if actual != spec.length() {
        return Err(GuessError::InvalidLength {
            expected: spec.length(),
            actual,
        });
    }
    if let Some((position, character)) = canonical
        .chars()
        .enumerate()
        .find(|(_, c)| !spec.charset().accepts(*c))
    {
        return Err(GuessError::InvalidCharacter { character, position });
    }
    Ok(canonical)
}

/// Evaluates `guess` against `target`, given what was already revealed.
///
/// A win reveals everything. Otherwise each matching position is revealed,
/// and only positions hidden in `prior` count as newly revealed.
///
/// # Errors
///
/// Returns [`GuessError::InvalidLength`] if the lengths differ.
#[instrument(skip(guess, target, prior))]
pub fn evaluate(
    guess: &str,
    target: &Secret,
    prior: &RevealedMask,
) -> Result<Evaluation, GuessError> {
    let guess = canonicalize(guess);
    let actual = guess.chars().count();
    if actual != target.len() {
        return Err(GuessError::InvalidLength {
            expected: target.len(),
            actual,
        });
    }

    if guess == target.as_str() {
        debug!("Guess matches secret");
        return Ok(Evaluation {
            guess,
            new_mask: RevealedMask::all_revealed(target.len()),
            newly_revealed: Vec::new(),
            is_win: true,
            label: ResultLabel::Win,
        });
    }

    let mut new_mask = prior.clone();
    let newly_revealed: Vec<usize> = guess
        .chars()
        .zip(target.chars())
        .enumerate()
        .filter(|(_, (g, t))| g == t)
        .filter_map(|(i, _)| new_mask.reveal(i).then_some(i))
        .collect();

    let label = match newly_revealed.len() {
        0 => ResultLabel::NoMatches,
        n => ResultLabel::Revealed(n),
    };
    debug!(newly_revealed = newly_revealed.len(), "Guess evaluated");

    Ok(Evaluation {
        guess,
        new_mask,
        newly_revealed,
        is_win: false,
        label,
    })
}
