//! Loading and validating model config files.
//!
//! A config is one JSON object with `model`, `encoding`, `training` and an
//! optional `transformations` section. Everything structural is validated
//! when the config is constructed, so the codec can assume a well-formed
//! alphabet from then on.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Reason, bail};

/// Container for all configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub encoding: EncodingConfig,
    pub training: TrainingConfig,
    #[serde(default)]
    pub transformations: Transformations,
}

/// Configuration of the model's composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The entire alphabet of the model, in ascending character order.
    pub alphabet: String,
    /// Capacity of the model backend: the maximum number of distinct
    /// contexts retained during training, 0 for unbounded.
    pub nodes: usize,
    /// The length of the input window the model consumes per prediction.
    pub sequence_length: usize,
    /// The delimiting character between tokens, e.g. `' '` for a model
    /// that generates words.
    pub boundary: char,
    /// Where the trained weights live, relative to the config file.
    pub weights_file: PathBuf,
}

/// Configuration of the encoding process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Number of characters run through the randomized model to settle its
    /// output distribution.
    pub normalizing_length: usize,
    /// Number of characters generated after normalization to seed the
    /// sequence that encoding continues from.
    pub priming_length: usize,
    /// How many times to retry padding before giving up.
    #[serde(default = "default_max_padding_trials")]
    pub max_padding_trials: usize,
    /// Novelty multiplier applied after each failed padding attempt. A
    /// slight growth raises the odds of a long-enough token while barely
    /// skewing the model's output distribution.
    #[serde(default = "default_padding_novelty_growth_rate")]
    pub padding_novelty_growth_rate: f64,
    /// The novelty (a.k.a. temperature) used when normalizing prediction
    /// weights. Smaller is more conservative.
    #[serde(default = "default_novelty")]
    pub novelty: f64,
}

/// Configuration of model training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of the data withheld to report a validation metric.
    pub validation_split: f64,
    /// Accepted for schema compatibility; the count-based trainer makes a
    /// single exact pass and has no use for batching.
    pub batch_size: usize,
    /// Accepted for schema compatibility, as with `batch_size`.
    pub epochs: usize,
}

/// Transformations applied to data before it reaches the model.
/// Translation runs before the substitutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transformations {
    /// Two equal-length strings; characters from the first are replaced
    /// with the corresponding characters from the second.
    #[serde(default)]
    pub translate: Option<(String, String)>,
    /// Regular expressions and the strings that replace their matches.
    #[serde(default)]
    pub substitutions: Option<Vec<(String, String)>>,
}

fn default_max_padding_trials() -> usize {
    1000
}

fn default_padding_novelty_growth_rate() -> f64 {
    1.01
}

fn default_novelty() -> f64 {
    0.4
}

impl Config {
    /// Checks the structural invariants the codec relies on.
    pub fn validate(&self) -> Result<(), Reason> {
        let alphabet: Vec<char> = self.model.alphabet.chars().collect();
        bail!(
            alphabet.len() < 2,
            Reason::AlphabetMismatch(format!(
                "need at least two characters, got {}",
                alphabet.len()
            ))
        );
        bail!(
            !alphabet.windows(2).all(|pair| pair[0] < pair[1]),
            Reason::AlphabetMismatch(
                "characters must be in ascending order without duplicates".into()
            )
        );
        bail!(
            !alphabet.contains(&self.model.boundary),
            Reason::BoundaryMissing(self.model.boundary)
        );

        bail!(
            !(self.encoding.novelty > 0.0) || !self.encoding.novelty.is_finite(),
            Reason::ConfigInvalid(format!(
                "novelty must be a positive number, got {}",
                self.encoding.novelty
            )),
            self.encoding.padding_novelty_growth_rate < 1.0,
            Reason::ConfigInvalid(format!(
                "padding_novelty_growth_rate must be at least 1, got {}",
                self.encoding.padding_novelty_growth_rate
            )),
            !(0.0..1.0).contains(&self.training.validation_split),
            Reason::ConfigInvalid(format!(
                "validation_split must be within [0, 1), got {}",
                self.training.validation_split
            )),
        );

        if let Some((from, to)) = &self.transformations.translate {
            bail!(
                from.chars().count() != to.chars().count(),
                Reason::ConfigInvalid(
                    "translate strings must have the same character length".into()
                )
            );
        }

        Ok(())
    }
}

/// Reads a JSON config file and constructs a validated [`Config`].
///
/// The `weights_file` path is resolved relative to the config file's
/// directory.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, Reason> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let mut config: Config = serde_json::from_str(&raw)?;

    if let Some(directory) = path.parent() {
        config.model.weights_file = directory.join(&config.model.weights_file);
    }

    config.validate()?;
    Ok(config)
}
