//! Hidden codes and the per-position revealed mask.
//!
//! A secret is canonicalized (trimmed, upper-cased) before storage, and its
//! length is measured in characters so that Cyrillic words count correctly.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Code length used by numbers mode.
pub const NUMBER_LENGTH: usize = 4;

/// Letter set accepted by words mode.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Alphabet {
    /// Upper-case Russian letters А-Я plus Ё.
    #[default]
    Cyrillic,
    /// Upper-case ASCII letters A-Z.
    Latin,
}

impl Alphabet {
    /// Whether `c` is a canonical (upper-case) letter of this alphabet.
    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Cyrillic => ('А'..='Я').contains(&c) || c == 'Ё',
            Self::Latin => c.is_ascii_uppercase(),
        }
    }

    /// All canonical letters of this alphabet.
    pub fn letters(self) -> Vec<char> {
        match self {
            Self::Cyrillic => ('А'..='Я').chain(std::iter::once('Ё')).collect(),
            Self::Latin => ('A'..='Z').collect(),
        }
    }
}

/// Word length allowed in words mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum WordLength {
    /// Five letters.
    #[default]
    Five,
    /// Six letters.
    Six,
    /// Ten letters.
    Ten,
}

impl WordLength {
    /// Number of letters.
    pub fn len(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Ten => 10,
        }
    }
}

impl TryFrom<usize> for WordLength {
    type Error = SecretError;

    fn try_from(len: usize) -> Result<Self, Self::Error> {
        match len {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            10 => Ok(Self::Ten),
            other => Err(SecretError::UnsupportedLength(other)),
        }
    }
}

impl From<WordLength> for usize {
    fn from(len: WordLength) -> Self {
        len.len()
    }
}

/// Character class a secret is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "alphabet", rename_all = "snake_case")]
pub enum Charset {
    /// Decimal digits 0-9.
    Digits,
    /// Letters of the given alphabet.
    Letters(Alphabet),
}

impl Charset {
    /// Whether a canonical character belongs to this charset.
    pub fn accepts(self, c: char) -> bool {
        match self {
            Self::Digits => c.is_ascii_digit(),
            Self::Letters(alphabet) => alphabet.contains(c),
        }
    }
}

/// Shape every secret and guess in a code match must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct SecretSpec {
    charset: Charset,
    length: usize,
}

impl SecretSpec {
    /// Spec for numbers mode: four digits.
    pub fn numbers() -> Self {
        Self::new(Charset::Digits, NUMBER_LENGTH)
    }

    /// Spec for words mode.
    pub fn words(length: WordLength, alphabet: Alphabet) -> Self {
        Self::new(Charset::Letters(alphabet), length.len())
    }

    /// Accepted characters.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Required length in characters.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// Trims and upper-cases raw player input.
pub(crate) fn canonicalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Error raised when a submitted secret is malformed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SecretError {
    /// The secret has the wrong number of characters.
    #[display("Secret must be {} characters long, got {}", expected, actual)]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Submitted length.
        actual: usize,
    },

    /// A character is outside the mode's charset.
    #[display("Character '{}' at position {} is not allowed", character, position)]
    InvalidCharacter {
        /// Offending character (canonical form).
        character: char,
        /// Zero-based position.
        position: usize,
    },

    /// Words mode only supports 5, 6 and 10 letters.
    #[display("Unsupported word length {}", _0)]
    UnsupportedLength(usize),
}

impl std::error::Error for SecretError {}

/// A validated, canonical secret code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Validates raw input against `spec` and returns the canonical secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] on length or charset mismatch.
    #[instrument(skip(raw), fields(length = spec.length()))]
    pub fn parse(raw: &str, spec: SecretSpec) -> Result<Self, SecretError> {
        let canonical = canonicalize(raw);
        let actual = canonical.chars().count();
        if actual != spec.length() {
            return Err(SecretError::WrongLength {
                expected: spec.length(),
                actual,
            });
        }
        if let Some((position, character)) = canonical
            .chars()
            .enumerate()
            .find(|(_, c)| !spec.charset().accepts(*c))
        {
            return Err(SecretError::InvalidCharacter { character, position });
        }
        debug!("Secret accepted");
        Ok(Self(canonical))
    }

    /// Draws a uniformly random secret matching `spec`.
    ///
    /// Letter secrets are random strings, not dictionary words.
    pub fn random<R: Rng + ?Sized>(spec: SecretSpec, rng: &mut R) -> Self {
        let code = match spec.charset() {
            Charset::Digits => (0..spec.length())
                .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
                .collect(),
            Charset::Letters(alphabet) => {
                let letters = alphabet.letters();
                (0..spec.length())
                    .filter_map(|_| letters.choose(rng).copied())
                    .collect()
            }
        };
        Self(code)
    }

    /// Canonical text of the secret.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the secret is empty. Validated secrets never are.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Characters of the secret in order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }
}

/// Which positions of a secret the opponent has deduced.
///
/// Entries only ever flip from hidden to revealed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealedMask(Vec<bool>);

impl RevealedMask {
    /// A mask of `len` hidden positions.
    pub fn hidden(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// A mask with every position revealed.
    pub fn all_revealed(len: usize) -> Self {
        Self(vec![true; len])
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mask has no positions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether position `i` is revealed. Out-of-range positions are hidden.
    pub fn is_revealed(&self, i: usize) -> bool {
        self.0.get(i).copied().unwrap_or(false)
    }

    /// Count of revealed positions.
    pub fn revealed_count(&self) -> usize {
        self.0.iter().filter(|r| **r).count()
    }

    /// Whether every position is revealed.
    pub fn is_fully_revealed(&self) -> bool {
        self.0.iter().all(|r| *r)
    }

    /// The mask as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Reveals position `i`, returning `true` if it was hidden before.
    pub(crate) fn reveal(&mut self, i: usize) -> bool {
        match self.0.get_mut(i) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }
}

/// A committed secret together with how much of it has been revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedSecret {
    secret: Secret,
    revealed: RevealedMask,
}

impl CommittedSecret {
    /// Validates `raw` and pairs it with an all-hidden mask of the same length.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] if `raw` does not satisfy `spec`.
    #[instrument(skip(raw))]
    pub fn commit(raw: &str, spec: SecretSpec) -> Result<Self, SecretError> {
        let secret = Secret::parse(raw, spec)?;
        let revealed = RevealedMask::hidden(secret.len());
        Ok(Self { secret, revealed })
    }

    /// The secret itself.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// The revealed mask.
    pub fn revealed(&self) -> &RevealedMask {
        &self.revealed
    }

    /// Revealed characters in order, `None` where still hidden.
    pub fn revealed_characters(&self) -> Vec<Option<char>> {
        self.secret
            .chars()
            .enumerate()
            .map(|(i, c)| self.revealed.is_revealed(i).then_some(c))
            .collect()
    }

    /// Replaces the mask with a successor. Monotonicity is the evaluator's job.
    pub(crate) fn set_revealed(&mut self, mask: RevealedMask) {
        self.revealed = mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn numbers_secret_accepts_four_digits() {
        let secret = Secret::parse("1234", SecretSpec::numbers()).expect("valid");
        assert_eq!(secret.as_str(), "1234");
        assert_eq!(secret.len(), 4);
    }

    #[test]
    fn numbers_secret_rejects_wrong_length() {
        let err = Secret::parse("123", SecretSpec::numbers()).unwrap_err();
        assert_eq!(
            err,
            SecretError::WrongLength {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn numbers_secret_rejects_letters() {
        let err = Secret::parse("12a4", SecretSpec::numbers()).unwrap_err();
        assert!(matches!(
            err,
            SecretError::InvalidCharacter { position: 2, .. }
        ));
    }

    #[test]
    fn cyrillic_word_is_upper_cased_and_counted_in_chars() {
        let spec = SecretSpec::words(WordLength::Five, Alphabet::Cyrillic);
        let secret = Secret::parse("ёжики", spec).expect("valid");
        assert_eq!(secret.as_str(), "ЁЖИКИ");
        assert_eq!(secret.len(), 5);
    }

    #[test]
    fn cyrillic_word_rejects_latin_letters() {
        let spec = SecretSpec::words(WordLength::Five, Alphabet::Cyrillic);
        assert!(Secret::parse("HELLO", spec).is_err());
    }

    #[test]
    fn latin_alphabet_accepts_ascii_words() {
        let spec = SecretSpec::words(WordLength::Six, Alphabet::Latin);
        let secret = Secret::parse("Planet", spec).expect("valid");
        assert_eq!(secret.as_str(), "PLANET");
    }

    #[test]
    fn word_length_only_allows_five_six_ten() {
        assert_eq!(WordLength::try_from(10), Ok(WordLength::Ten));
        assert_eq!(
            WordLength::try_from(7),
            Err(SecretError::UnsupportedLength(7))
        );
    }

    #[test]
    fn committed_secret_starts_fully_hidden() {
        let committed = CommittedSecret::commit("4821", SecretSpec::numbers()).expect("valid");
        assert_eq!(committed.revealed().len(), 4);
        assert_eq!(committed.revealed().revealed_count(), 0);
    }

    #[test]
    fn reveal_is_monotonic() {
        let mut mask = RevealedMask::hidden(3);
        assert!(mask.reveal(1));
        assert!(!mask.reveal(1));
        assert!(!mask.reveal(9));
        assert_eq!(mask.as_slice(), &[false, true, false]);
    }

    #[test]
    fn random_secret_matches_its_spec() {
        let mut rng = StdRng::seed_from_u64(7);
        for spec in [
            SecretSpec::numbers(),
            SecretSpec::words(WordLength::Ten, Alphabet::Cyrillic),
        ] {
            let secret = Secret::random(spec, &mut rng);
            assert!(Secret::parse(secret.as_str(), spec).is_ok());
        }
    }
}
