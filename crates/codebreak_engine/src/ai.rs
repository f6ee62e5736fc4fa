//! A random opponent for automated play.
//!
//! It keeps every character it has already uncovered and randomizes the
//! rest. It fires only at cells it has not tried.

use crate::battleship::{Coord, Fleet, GRID_SIZE, Shot};
use crate::secret::{Charset, Secret, SecretSpec};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Opponent that plays legal but uninformed moves.
#[derive(Debug, Clone)]
pub struct RandomOpponent<R> {
    rng: R,
}

impl<R: Rng> RandomOpponent<R> {
    /// Wraps a random number generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// A random secret for `spec`.
    #[instrument(skip(self))]
    pub fn secret(&mut self, spec: SecretSpec) -> Secret {
        Secret::random(spec, &mut self.rng)
    }

    /// A random legal fleet.
    #[instrument(skip(self))]
    pub fn fleet(&mut self) -> Fleet {
        Fleet::random(&mut self.rng)
    }

    /// A guess that keeps `known` characters and fills the gaps at random.
    ///
    /// `known` has one slot per position of the target secret.
    #[instrument(skip(self, known), fields(known = known.iter().flatten().count()))]
    pub fn guess(&mut self, spec: SecretSpec, known: &[Option<char>]) -> String {
        let pool: Vec<char> = match spec.charset() {
            Charset::Digits => ('0'..='9').collect(),
            Charset::Letters(alphabet) => alphabet.letters(),
        };
        let guess: String = (0..spec.length())
            .map(|i| match known.get(i).copied().flatten() {
                Some(c) => c,
                None => pool.choose(&mut self.rng).copied().unwrap_or('0'),
            })
            .collect();
        debug!(%guess, "Random guess chosen");
        guess
    }

    /// A random cell not yet in `prior`, or `None` when the grid is exhausted.
    #[instrument(skip(self, prior), fields(prior = prior.len()))]
    pub fn shot(&mut self, prior: &[Shot]) -> Option<Coord> {
        let open: Vec<Coord> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| Coord::new(row, col)))
            .filter(|coord| prior.iter().all(|shot| shot.coord != *coord))
            .collect();
        open.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battleship::ShotResult;
    use crate::secret::{Alphabet, WordLength};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn guess_keeps_known_characters() {
        let mut ai = RandomOpponent::new(StdRng::seed_from_u64(5));
        let guess = ai.guess(SecretSpec::numbers(), &[Some('7'), None, None, Some('1')]);
        let chars: Vec<char> = guess.chars().collect();
        assert_eq!(chars.len(), 4);
        assert_eq!(chars[0], '7');
        assert_eq!(chars[3], '1');
        assert!(chars.iter().all(char::is_ascii_digit));
    }

    #[test]
    fn word_guess_uses_the_alphabet() {
        let mut ai = RandomOpponent::new(StdRng::seed_from_u64(5));
        let spec = SecretSpec::words(WordLength::Six, Alphabet::Cyrillic);
        let guess = ai.guess(spec, &[None; 6]);
        assert_eq!(guess.chars().count(), 6);
        assert!(guess.chars().all(|c| Alphabet::Cyrillic.contains(c)));
    }

    #[test]
    fn shot_avoids_prior_cells() {
        let mut ai = RandomOpponent::new(StdRng::seed_from_u64(5));
        let prior: Vec<Shot> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| Coord::new(row, col)))
            .filter(|coord| *coord != Coord::new(4, 4))
            .map(|coord| Shot { coord, result: ShotResult::Miss, ship: None })
            .collect();
        assert_eq!(ai.shot(&prior), Some(Coord::new(4, 4)));
        let mut all = prior;
        all.push(Shot { coord: Coord::new(4, 4), result: ShotResult::Miss, ship: None });
        assert_eq!(ai.shot(&all), None);
    }
}
