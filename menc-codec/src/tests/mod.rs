//! Round-trip suites driven by mock models.
//!
//! The mocks predict from closed-form distributions, so every failure here
//! is a codec failure rather than a modeling artifact. All randomness comes
//! from seeded RNGs to keep the suites reproducible.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::model::LanguageModel;

mod encoding;
mod markov;

pub(crate) fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// A model with fixed predictions and configurable codec parameters.
pub(crate) struct MockModel {
    alphabet: Vec<char>,
    boundary: char,
    sequence_length: usize,
    normalizing_length: usize,
    priming_length: usize,
    max_padding_trials: usize,
    novelty: f64,
    padding_novelty_growth_rate: f64,
    skewed: bool,
}

impl MockModel {
    /// Alphabet `"012"` with boundary `'0'`, no window and no prefixes:
    /// the smallest configuration that exercises the raw codec.
    pub(crate) fn uniform() -> Self {
        Self {
            alphabet: vec!['0', '1', '2'],
            boundary: '0',
            sequence_length: 0,
            normalizing_length: 0,
            priming_length: 0,
            max_padding_trials: 1000,
            novelty: 0.5,
            padding_novelty_growth_rate: 1.01,
            skewed: false,
        }
    }

    /// Alphabet `"01"` with boundary `'1'`, a three-character window and
    /// full normalizing/priming prefixes.
    pub(crate) fn binary() -> Self {
        Self {
            alphabet: vec!['0', '1'],
            boundary: '1',
            sequence_length: 3,
            normalizing_length: 10,
            priming_length: 10,
            max_padding_trials: 100,
            novelty: 0.5,
            padding_novelty_growth_rate: 1.01,
            skewed: false,
        }
    }

    /// Like [`MockModel::uniform`] but with a two-character window and
    /// window-dependent predictions, so any window drift between the two
    /// scan directions breaks the round trip loudly.
    pub(crate) fn skewed() -> Self {
        Self {
            alphabet: vec!['0', '1', '2'],
            boundary: '0',
            sequence_length: 2,
            normalizing_length: 4,
            priming_length: 4,
            max_padding_trials: 1000,
            novelty: 0.5,
            padding_novelty_growth_rate: 1.01,
            skewed: true,
        }
    }

    pub(crate) fn random_message<R: rand::Rng>(&self, length: usize, rng: &mut R) -> Vec<char> {
        (0..length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }
}

impl LanguageModel for MockModel {
    fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn boundary(&self) -> char {
        self.boundary
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn normalizing_length(&self) -> usize {
        self.normalizing_length
    }

    fn priming_length(&self) -> usize {
        self.priming_length
    }

    fn novelty(&self) -> f64 {
        self.novelty
    }

    fn max_padding_trials(&self) -> usize {
        self.max_padding_trials
    }

    fn padding_novelty_growth_rate(&self) -> f64 {
        self.padding_novelty_growth_rate
    }

    fn predict(&self, window: &[char]) -> Vec<f64> {
        let width = self.alphabet.len();
        if !self.skewed {
            return vec![1.0 / width as f64; width];
        }

        let anchor = window
            .last()
            .and_then(|value| self.alphabet.iter().position(|a| a == value))
            .unwrap_or(0);
        let raw: Vec<f64> = (0..width)
            .map(|position| (1 + (anchor + position) % width) as f64)
            .collect();
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|value| value / total).collect()
    }
}
