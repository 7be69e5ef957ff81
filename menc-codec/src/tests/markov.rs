use std::path::Path;

use super::rng;
use crate::Reason;
use crate::config::{Config, EncodingConfig, ModelConfig, TrainingConfig, Transformations};
use crate::encoding::{decode, encode};
use crate::encryption::{decrypt, encrypt};
use crate::model::{LanguageModel, MarkovModel};

const CORPUS: &str = "abc cab bca bac acb cba abc cab abc bca abc cab bac abc ";

fn word_config(weights_file: &Path) -> Config {
    Config {
        model: ModelConfig {
            alphabet: " abc".to_string(),
            nodes: 0,
            sequence_length: 2,
            boundary: ' ',
            weights_file: weights_file.to_path_buf(),
        },
        encoding: EncodingConfig {
            normalizing_length: 4,
            priming_length: 4,
            max_padding_trials: 1000,
            padding_novelty_growth_rate: 1.01,
            novelty: 0.8,
        },
        training: TrainingConfig {
            validation_split: 0.1,
            batch_size: 32,
            epochs: 1,
        },
        transformations: Transformations::default(),
    }
}

fn trained_model(directory: &Path) -> MarkovModel {
    let mut model = MarkovModel::new(word_config(&directory.join("weights.bin"))).unwrap();
    model.train(CORPUS).unwrap();
    model
}

#[test]
fn untrained_models_predict_uniformly() {
    let directory = tempfile::tempdir().unwrap();
    let model = MarkovModel::new(word_config(&directory.path().join("weights.bin"))).unwrap();

    let probabilities = model.predict(&['a', 'b']);
    assert_eq!(probabilities, vec![0.25; 4]);
}

#[test]
fn trained_predictions_track_the_corpus() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());

    let probabilities = model.predict(&['a', 'b']);
    assert_eq!(probabilities.len(), 4);
    let total: f64 = probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);

    // "ab" is always followed by "c" in the corpus.
    let c = model.alphabet().iter().position(|&v| v == 'c').unwrap();
    let b = model.alphabet().iter().position(|&v| v == 'b').unwrap();
    assert!(probabilities[c] > probabilities[b]);
}

#[test]
fn unseen_contexts_back_off_to_shorter_ones() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());

    // A window the corpus never contains still gets a usable, non-uniform
    // distribution from the shorter suffix contexts.
    let probabilities = model.predict(&['c', 'c']);
    let total: f64 = probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(probabilities.iter().any(|&p| (p - 0.25).abs() > 1e-3));
}

#[test]
fn transformations_run_before_validation() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = word_config(&directory.path().join("weights.bin"));
    config.transformations.translate = Some(("ABC".to_string(), "abc".to_string()));
    config.transformations.substitutions = Some(vec![("[.,]+".to_string(), " ".to_string())]);
    let model = MarkovModel::new(config).unwrap();

    assert_eq!(model.transform("A.b,c").unwrap(), "a b c");
    assert!(matches!(
        model.transform("xyz"),
        Err(Reason::NonAlphabetChar('x'))
    ));
}

#[test]
fn bad_substitution_patterns_fail_at_construction() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = word_config(&directory.path().join("weights.bin"));
    config.transformations.substitutions = Some(vec![("[".to_string(), " ".to_string())]);

    assert!(matches!(
        MarkovModel::new(config),
        Err(Reason::ConfigInvalid(_))
    ));
}

#[test]
fn saved_weights_reload_into_an_equivalent_model() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());
    model.save().unwrap();

    let reloaded = MarkovModel::new(word_config(&directory.path().join("weights.bin"))).unwrap();
    let mut rng = rng(51);

    for message in ["abc ", "cab abc ", "bca bac acb "] {
        let data = encode(&model, message, 16, &mut rng).unwrap();
        assert_eq!(decode(&reloaded, &data).unwrap(), message);
    }
}

#[test]
fn weights_files_must_match_the_config() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());
    model.save().unwrap();

    let mut config = word_config(&directory.path().join("weights.bin"));
    config.model.alphabet = " abd".to_string();
    assert!(matches!(
        MarkovModel::new(config),
        Err(Reason::AlphabetMismatch(_))
    ));

    let mut config = word_config(&directory.path().join("weights.bin"));
    config.model.sequence_length = 3;
    assert!(matches!(
        MarkovModel::new(config),
        Err(Reason::WeightsInvalid(_))
    ));
}

#[test]
fn samples_stay_inside_the_alphabet() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());
    let mut rng = rng(52);

    let sampled = model.sample(25, None, &mut rng).unwrap();
    assert_eq!(sampled.chars().count(), 25);
    assert!(sampled.chars().all(|value| " abc".contains(value)));
}

#[test]
fn trained_models_encrypt_and_decrypt() {
    let directory = tempfile::tempdir().unwrap();
    let model = trained_model(directory.path());
    let mut rng = rng(53);

    for message in ["abc", "cab bac", "a b c abc "] {
        let ciphertext = encrypt(&model, "foo", message, &mut rng).unwrap();
        let expected = if message.ends_with(' ') {
            message.to_string()
        } else {
            format!("{message} ")
        };
        assert_eq!(decrypt(&model, "foo", &ciphertext).unwrap(), expected);
    }
}

#[test]
fn context_capacity_bounds_the_table() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = word_config(&directory.path().join("weights.bin"));
    config.model.nodes = 3;
    let mut model = MarkovModel::new(config).unwrap();
    model.train(CORPUS).unwrap();

    // Prediction still works from whatever contexts were admitted.
    let probabilities = model.predict(&['a', 'b']);
    let total: f64 = probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}
