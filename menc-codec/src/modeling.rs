//! Driving a language model one character at a time.
//!
//! Both directions of the codec are the same scan: keep a sliding window of
//! the most recent characters, turn the model's next-character distribution
//! into an integer weight table, and step. [`tabulate`] walks a character
//! sequence and records a random weight inside each character's interval;
//! [`recite`] walks a weight sequence and resolves each weight back to its
//! character. Feeding `recite` the weights that `tabulate` produced yields
//! the original characters, because the window evolves identically on both
//! sides.

use rand::{CryptoRng, Rng, RngCore};

use crate::{
    Reason,
    maths::{log_normalize, scale},
    model::LanguageModel,
    packing::MAX_WEIGHT,
    sampling::{choose_choice, choose_weight},
};

/// Total coverage of one weight table: weights are drawn `0..=MAX_WEIGHT`,
/// so the table entries sum to one past the largest weight.
pub(crate) const WEIGHT_TOTAL: u64 = MAX_WEIGHT as u64 + 1;

/// Sliding-window driver shared by both scan directions.
pub(crate) struct Scanner<'m, M: LanguageModel + ?Sized> {
    model: &'m M,
    window: Vec<char>,
    novelty: f64,
}

impl<'m, M: LanguageModel + ?Sized> Scanner<'m, M> {
    pub(crate) fn new(model: &'m M, initial: &[char], novelty: Option<f64>) -> Self {
        let keep = initial.len().saturating_sub(model.sequence_length());
        Self {
            model,
            window: initial[keep..].to_vec(),
            novelty: novelty.unwrap_or_else(|| model.novelty()),
        }
    }

    pub(crate) fn model(&self) -> &'m M {
        self.model
    }

    /// Weight table for the next prediction: the raw distribution,
    /// temperature-normalized, then scaled so the entries cover the whole
    /// weight range with a floor of one. The floor keeps every symbol
    /// reachable no matter how confident the model is.
    pub(crate) fn weigh(&self) -> Vec<u32> {
        let probabilities = self.model.predict(&self.window);
        let normalized = log_normalize(&probabilities, self.novelty);
        scale(&normalized, WEIGHT_TOTAL, 1)
    }

    /// Pushes the resolved character and keeps the window at
    /// `sequence_length` characters from the right.
    pub(crate) fn advance(&mut self, next: char) {
        self.window.push(next);
        let length = self.model.sequence_length();
        if self.window.len() > length {
            let cut = self.window.len() - length;
            self.window.drain(..cut);
        }
    }
}

/// Iterator produced by [`tabulate`]: characters in, weights out.
pub struct Tabulate<'m, 'r, M, I, R>
where
    M: LanguageModel + ?Sized,
    R: Rng + CryptoRng + ?Sized,
{
    scan: Scanner<'m, M>,
    values: I,
    rng: &'r mut R,
}

impl<'m, 'r, M, I, R> Iterator for Tabulate<'m, 'r, M, I, R>
where
    M: LanguageModel + ?Sized,
    I: Iterator<Item = char>,
    R: Rng + CryptoRng + ?Sized,
{
    type Item = Result<u32, Reason>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.values.next()?;
        let alphabet = self.scan.model().alphabet();
        if !alphabet.contains(&value) {
            return Some(Err(Reason::NonAlphabetChar(value)));
        }

        let table = self.scan.weigh();
        let weight = match choose_weight(&value, alphabet, &table, self.rng) {
            Ok(Some(weight)) => weight,
            // The scaler floors every entry at one, so the interval of an
            // alphabet character is never empty.
            Ok(None) => return Some(Err(Reason::ChoiceMissing)),
            Err(reason) => return Some(Err(reason)),
        };

        self.scan.advance(value);
        Some(Ok(weight))
    }
}

/// Iterator produced by [`recite`]: weights in, characters out.
pub struct Recite<'m, M, I>
where
    M: LanguageModel + ?Sized,
{
    scan: Scanner<'m, M>,
    weights: I,
}

impl<'m, M, I> Iterator for Recite<'m, M, I>
where
    M: LanguageModel + ?Sized,
    I: Iterator<Item = u32>,
{
    type Item = Result<char, Reason>;

    fn next(&mut self) -> Option<Self::Item> {
        let weight = self.weights.next()?;
        let table = self.scan.weigh();
        let value = match choose_choice(weight, self.scan.model().alphabet(), &table) {
            Ok(value) => *value,
            Err(reason) => return Some(Err(reason)),
        };

        self.scan.advance(value);
        Some(Ok(value))
    }
}

/// Turns a character sequence into the weight sequence that recites back to
/// it.
///
/// The weights are randomized inside each character's interval, so two runs
/// over the same input produce different weight streams that both decode to
/// the same characters. `novelty` overrides the model's configured value
/// when given.
pub fn tabulate<'m, 'r, M, I, R>(
    model: &'m M,
    initial: &[char],
    values: I,
    novelty: Option<f64>,
    rng: &'r mut R,
) -> Tabulate<'m, 'r, M, I::IntoIter, R>
where
    M: LanguageModel + ?Sized,
    I: IntoIterator<Item = char>,
    R: Rng + CryptoRng + ?Sized,
{
    Tabulate {
        scan: Scanner::new(model, initial, novelty),
        values: values.into_iter(),
        rng,
    }
}

/// Turns a weight sequence back into the characters chosen by those weights.
///
/// Fully deterministic given the model, the initial window and the weights.
pub fn recite<'m, M, I>(
    model: &'m M,
    initial: &[char],
    weights: I,
    novelty: Option<f64>,
) -> Recite<'m, M, I::IntoIter>
where
    M: LanguageModel + ?Sized,
    I: IntoIterator<Item = u32>,
{
    Recite {
        scan: Scanner::new(model, initial, novelty),
        weights: weights.into_iter(),
    }
}

/// An endless stream of uniformly random weights.
pub struct RandomWeights<'r, R: ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: RngCore + ?Sized> Iterator for RandomWeights<'r, R> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.rng.next_u32())
    }
}

/// Generates an infinite stream of random 32-bit weights from `rng`.
pub fn random_weights<R>(rng: &mut R) -> RandomWeights<'_, R>
where
    R: RngCore + CryptoRng + ?Sized,
{
    RandomWeights { rng }
}
