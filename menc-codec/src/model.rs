//! The model capability and the count-based backend behind it.
//!
//! The codec only ever consumes a model through [`LanguageModel`]: an
//! ordered alphabet, a window size, a boundary character, the encoding
//! parameters, and a raw next-character distribution. [`MarkovModel`]
//! implements the capability with order-`sequence_length` transition
//! counts, which keeps `predict` deterministic — a requirement for the
//! decode side to reproduce the encode side exactly.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;

use rand::{CryptoRng, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Reason, bail,
    config::{Config, load_config},
    modeling::{random_weights, recite},
};

/// The capability the codec consumes from a language model.
pub trait LanguageModel {
    /// The model's alphabet, in ascending character order.
    fn alphabet(&self) -> &[char];

    /// The token-separating member of the alphabet.
    fn boundary(&self) -> char;

    /// Number of trailing characters the model consumes per prediction.
    fn sequence_length(&self) -> usize;

    /// Length of the normalization prefix the codec emits.
    fn normalizing_length(&self) -> usize;

    /// Length of the priming prefix the codec emits.
    fn priming_length(&self) -> usize;

    /// Default novelty (temperature) for weight tables.
    fn novelty(&self) -> f64;

    /// Attempt budget for the padding sampler.
    fn max_padding_trials(&self) -> usize;

    /// Novelty multiplier applied across padding retries.
    fn padding_novelty_growth_rate(&self) -> f64;

    /// Raw probability of each alphabet character following `window`.
    ///
    /// `window` holds at most `sequence_length` characters but may be
    /// shorter, including empty, while a sequence is still building up.
    /// The returned vector matches the alphabet in length and order and
    /// sums to one. Must be deterministic in `window`.
    fn predict(&self, window: &[char]) -> Vec<f64>;
}

/// Persisted form of a trained model.
#[derive(Serialize, Deserialize)]
struct StoredWeights {
    alphabet: String,
    sequence_length: usize,
    counts: HashMap<String, Vec<u64>>,
}

/// A character model backed by transition counts for every context length
/// up to `sequence_length`.
///
/// Prediction backs off from the longest stored context suffix to shorter
/// ones, with add-one smoothing inside each context; an untrained model
/// predicts uniformly.
pub struct MarkovModel {
    config: Config,
    alphabet: Vec<char>,
    index: HashMap<char, usize>,
    translate: Option<HashMap<char, char>>,
    substitutions: Vec<(Regex, String)>,
    counts: HashMap<String, Vec<u64>>,
}

impl MarkovModel {
    /// Builds a model from a validated config, loading previously trained
    /// weights when the configured weights file exists.
    pub fn new(config: Config) -> Result<Self, Reason> {
        config.validate()?;

        let alphabet: Vec<char> = config.model.alphabet.chars().collect();
        let index = alphabet
            .iter()
            .enumerate()
            .map(|(position, &value)| (value, position))
            .collect();

        let translate = config
            .transformations
            .translate
            .as_ref()
            .map(|(from, to)| from.chars().zip(to.chars()).collect());

        let mut substitutions = Vec::new();
        for (pattern, replacement) in config
            .transformations
            .substitutions
            .as_deref()
            .unwrap_or_default()
        {
            let regex = Regex::new(pattern).map_err(|error| {
                Reason::ConfigInvalid(format!("bad substitution pattern {pattern:?}: {error}"))
            })?;
            substitutions.push((regex, replacement.clone()));
        }

        let mut model = Self {
            config,
            alphabet,
            index,
            translate,
            substitutions,
            counts: HashMap::new(),
        };

        if model.config.model.weights_file.is_file() {
            model.load_weights()?;
        }

        Ok(model)
    }

    /// The config the model was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies the configured transformations to `data`: character
    /// translation first, then the regex substitutions.
    ///
    /// Fails with [`Reason::NonAlphabetChar`] when the result still
    /// contains a character outside the alphabet.
    pub fn transform(&self, data: &str) -> Result<String, Reason> {
        let mut data = match &self.translate {
            Some(map) => data
                .chars()
                .map(|value| map.get(&value).copied().unwrap_or(value))
                .collect(),
            None => data.to_string(),
        };

        for (regex, replacement) in &self.substitutions {
            data = regex.replace_all(&data, replacement.as_str()).into_owned();
        }

        if let Some(bad) = data.chars().find(|value| !self.index.contains_key(value)) {
            return Err(Reason::NonAlphabetChar(bad));
        }

        Ok(data)
    }

    /// Trains the model on `data` after transforming it.
    ///
    /// Counts context → next-character transitions for every context
    /// length up to `sequence_length` over the training portion, then
    /// reports cross-entropy over the `validation_split` tail. The
    /// `nodes` capacity bounds how many distinct contexts are retained;
    /// once it is reached, only already-known contexts keep counting.
    pub fn train(&mut self, data: &str) -> Result<(), Reason> {
        let transformed = self.transform(data)?;
        let values: Vec<char> = transformed.chars().collect();

        let held = (values.len() as f64 * self.config.training.validation_split) as usize;
        let (training, validation) = values.split_at(values.len() - held);

        let order = self.config.model.sequence_length;
        let capacity = self.config.model.nodes;
        let width = self.alphabet.len();

        for position in 0..training.len() {
            let Some(next) = self.index.get(&training[position]).copied() else {
                continue;
            };
            for length in 0..=order.min(position) {
                let context: String = training[position - length..position].iter().collect();
                let at_capacity = capacity > 0 && self.counts.len() >= capacity;
                match self.counts.entry(context) {
                    Entry::Occupied(mut slot) => slot.get_mut()[next] += 1,
                    // Known contexts keep counting past the capacity; new
                    // ones are no longer admitted.
                    Entry::Vacant(slot) => {
                        if !at_capacity {
                            let mut fresh = vec![0u64; width];
                            fresh[next] = 1;
                            slot.insert(fresh);
                        }
                    }
                }
            }
        }

        info!(
            contexts = self.counts.len(),
            training_chars = training.len(),
            "trained transition counts"
        );

        if !validation.is_empty() {
            let bits = self.cross_entropy(validation);
            info!(validation_chars = validation.len(), bits_per_char = bits, "validation");
        }

        Ok(())
    }

    /// Saves the trained counts to the configured weights file.
    pub fn save(&self) -> Result<(), Reason> {
        let stored = StoredWeights {
            alphabet: self.config.model.alphabet.clone(),
            sequence_length: self.config.model.sequence_length,
            counts: self.counts.clone(),
        };
        let encoded = bincode::serialize(&stored)
            .map_err(|error| Reason::WeightsInvalid(error.to_string()))?;
        fs::write(&self.config.model.weights_file, encoded)?;
        info!(path = %self.config.model.weights_file.display(), "saved weights");
        Ok(())
    }

    /// Generates `size` characters of sample output from the model.
    pub fn sample<R>(&self, size: usize, novelty: Option<f64>, rng: &mut R) -> Result<String, Reason>
    where
        R: Rng + CryptoRng + ?Sized,
    {
        let mut initial = Vec::with_capacity(self.sequence_length().max(1));
        for _ in 0..self.sequence_length().saturating_sub(1) {
            initial.push(self.alphabet[rng.gen_range(0..self.alphabet.len())]);
        }
        initial.push(self.boundary());

        let mut sampled = String::with_capacity(size);
        let stream = recite(self, &initial, random_weights(rng), novelty);
        for value in stream.take(size) {
            sampled.push(value?);
        }
        Ok(sampled)
    }

    fn load_weights(&mut self) -> Result<(), Reason> {
        let raw = fs::read(&self.config.model.weights_file)?;
        let stored: StoredWeights = bincode::deserialize(&raw)
            .map_err(|error| Reason::WeightsInvalid(error.to_string()))?;

        bail!(
            stored.alphabet != self.config.model.alphabet,
            Reason::AlphabetMismatch(format!(
                "weights file was trained on alphabet {:?}",
                stored.alphabet
            )),
            stored.sequence_length != self.config.model.sequence_length,
            Reason::WeightsInvalid(format!(
                "weights file sequence length {} does not match the configured {}",
                stored.sequence_length, self.config.model.sequence_length
            )),
        );

        let width = self.alphabet.len();
        bail!(
            stored.counts.values().any(|row| row.len() != width),
            Reason::WeightsInvalid("count rows do not match the alphabet".into())
        );

        self.counts = stored.counts;
        Ok(())
    }

    /// Mean negative log2 probability per character over `values`.
    fn cross_entropy(&self, values: &[char]) -> f64 {
        let order = self.config.model.sequence_length;
        let mut bits = 0.0;
        for position in 0..values.len() {
            let Some(next) = self.index.get(&values[position]).copied() else {
                continue;
            };
            let start = position.saturating_sub(order);
            let probabilities = self.predict(&values[start..position]);
            bits -= probabilities[next].log2();
        }
        bits / values.len() as f64
    }

    fn smoothed(&self, counts: &[u64]) -> Vec<f64> {
        let width = self.alphabet.len() as f64;
        let total: u64 = counts.iter().sum();
        counts
            .iter()
            .map(|&count| (count as f64 + 1.0) / (total as f64 + width))
            .collect()
    }
}

impl LanguageModel for MarkovModel {
    fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn boundary(&self) -> char {
        self.config.model.boundary
    }

    fn sequence_length(&self) -> usize {
        self.config.model.sequence_length
    }

    fn normalizing_length(&self) -> usize {
        self.config.encoding.normalizing_length
    }

    fn priming_length(&self) -> usize {
        self.config.encoding.priming_length
    }

    fn novelty(&self) -> f64 {
        self.config.encoding.novelty
    }

    fn max_padding_trials(&self) -> usize {
        self.config.encoding.max_padding_trials
    }

    fn padding_novelty_growth_rate(&self) -> f64 {
        self.config.encoding.padding_novelty_growth_rate
    }

    fn predict(&self, window: &[char]) -> Vec<f64> {
        let start = window.len().saturating_sub(self.config.model.sequence_length);
        let window = &window[start..];

        for length in (0..=window.len()).rev() {
            let context: String = window[window.len() - length..].iter().collect();
            if let Some(counts) = self.counts.get(&context) {
                return self.smoothed(counts);
            }
        }

        vec![1.0 / self.alphabet.len() as f64; self.alphabet.len()]
    }
}

/// Loads a config file and builds the model it describes, picking up
/// trained weights when they exist next to the config.
pub fn load_model(path: impl AsRef<Path>) -> Result<MarkovModel, Reason> {
    let config = load_config(path)?;
    MarkovModel::new(config)
}
