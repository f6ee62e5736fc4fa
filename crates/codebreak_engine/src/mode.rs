//! Game modes and their creation-time configuration.

use crate::secret::{Alphabet, SecretSpec, WordLength};
use serde::{Deserialize, Serialize};

/// The three supported games.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum GameMode {
    /// Guess a four-digit code.
    Numbers,
    /// Guess a word.
    Words,
    /// Sink a fleet.
    Battleship,
}

/// Mode selection plus the settings that mode needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeConfig {
    /// Four-digit codes.
    Numbers,
    /// Words of a fixed length from one alphabet.
    Words {
        /// Letters per word.
        #[serde(default)]
        length: WordLength,
        /// Accepted letters.
        #[serde(default)]
        alphabet: Alphabet,
    },
    /// Fleets on a 10×10 grid.
    Battleship,
}

impl ModeConfig {
    /// Words mode with the default length and alphabet.
    pub fn words() -> Self {
        Self::Words {
            length: WordLength::default(),
            alphabet: Alphabet::default(),
        }
    }

    /// The bare mode tag.
    pub fn mode(&self) -> GameMode {
        match self {
            Self::Numbers => GameMode::Numbers,
            Self::Words { .. } => GameMode::Words,
            Self::Battleship => GameMode::Battleship,
        }
    }

    /// Secret shape for code modes, `None` for battleship.
    pub fn secret_spec(&self) -> Option<SecretSpec> {
        match *self {
            Self::Numbers => Some(SecretSpec::numbers()),
            Self::Words { length, alphabet } => Some(SecretSpec::words(length, alphabet)),
            Self::Battleship => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_config_defaults_to_five_cyrillic_letters() {
        let config: ModeConfig =
            serde_json::from_str(r#"{"mode":"words"}"#).expect("deserializes");
        assert_eq!(config, ModeConfig::words());
        assert_eq!(config.secret_spec().map(|s| s.length()), Some(5));
    }

    #[test]
    fn words_config_reads_explicit_length() {
        let config: ModeConfig =
            serde_json::from_str(r#"{"mode":"words","length":10,"alphabet":"latin"}"#)
                .expect("deserializes");
        assert_eq!(
            config,
            ModeConfig::Words {
                length: WordLength::Ten,
                alphabet: Alphabet::Latin
            }
        );
    }

    #[test]
    fn unsupported_word_length_fails_to_deserialize() {
        let result: Result<ModeConfig, _> = serde_json::from_str(r#"{"mode":"words","length":7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn battleship_has_no_secret() {
        assert_eq!(ModeConfig::Battleship.secret_spec(), None);
        assert_eq!(ModeConfig::Battleship.mode().to_string(), "BATTLESHIP");
    }
}
