//! # Menc Codec Library
//!
//! This crate implements model-based steganographic encryption: plaintext is
//! encoded into a stream of 32-bit integer weights by inverting a
//! character-level language model's predictions, the weight stream is
//! encrypted with AES-256 in CFB mode, and decryption reverses both steps.
//! Under the correct key the exact plaintext is recovered. Under a wrong key
//! the weights still decode to a plausible model-generated character
//! sequence instead of an error, which gives the construction its
//! deniability property.
//!
//! ## Features
//!
//! - Exact encode/decode duality over any [`LanguageModel`], see [`encode`],
//!   [`decode`].
//! - Token-aware padding that keeps padded payloads on-distribution while
//!   aligning them to a cipher block, see [`pad`], [`unpad`].
//! - AES-256-CFB cipher glue with SHA-256 key derivation, see [`encrypt`],
//!   [`decrypt`].
//! - A count-based language model backend with training, sampling and
//!   persistence, see [`MarkovModel`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use menc_codec::{decrypt, encrypt, load_model};
//! use rand::rngs::OsRng;
//!
//! let model = load_model("models/words/config.json").unwrap();
//!
//! let ciphertext = encrypt(&model, "secret key", "HELLO WORLD", &mut OsRng).unwrap();
//!
//! // The plaintext comes back boundary-terminated.
//! let plaintext = decrypt(&model, "secret key", &ciphertext).unwrap();
//! assert_eq!(plaintext, "HELLO WORLD ");
//! ```
//!
//! This crate implements NON-AUTHENTICATED encryption. Nothing detects
//! ciphertext tampering, and decrypting under a wrong key is
//! indistinguishable from a valid decryption by design of the construction.
use thiserror::Error;

pub use crate::{
    config::{
        Config, EncodingConfig, ModelConfig, TrainingConfig, Transformations, load_config,
    },
    encoding::{decode, encode},
    encryption::{CIPHER_BLOCK_SIZE, decrypt, derive_key, encrypt},
    maths::{log_normalize, scale},
    model::{LanguageModel, MarkovModel, load_model},
    modeling::{RandomWeights, Recite, Tabulate, random_weights, recite, tabulate},
    packing::{BYTES_PER_WEIGHT, MAX_WEIGHT, pack_ints, unpack_ints},
    padding::{pad, unpad},
    sampling::{choose_choice, choose_weight},
};

mod config;
mod encoding;
mod encryption;
mod maths;
mod model;
mod modeling;
mod packing;
mod padding;
mod sampling;

#[cfg(test)]
mod tests;

/// Errors returned by the codec as reasons during encoding, padding and
/// cipher operations.
#[derive(Error, Debug)]
pub enum Reason {
    #[error("[Menc-Error] Alphabet invalid: {0}")]
    AlphabetMismatch(String),
    #[error("[Menc-Error] Boundary character {0:?} is not present in the alphabet")]
    BoundaryMissing(char),
    #[error("[Menc-Error] Weights has length {weights}, but choices has length {choices}")]
    LengthMismatch { choices: usize, weights: usize },
    #[error("[Menc-Error] Weight {weight} is not within the table range 0..{total}")]
    OutOfRange { weight: u32, total: u64 },
    #[error("[Menc-Error] Choice is not present in the choice list")]
    ChoiceMissing,
    #[error("[Menc-Error] Byte buffer length {0} is not a multiple of 4")]
    BadLength(usize),
    #[error("[Menc-Error] Block size {0} must be positive and a multiple of 4")]
    BlockSizeInvalid(usize),
    #[error(
        "[Menc-Error] Failed to generate padding within {0} trials. This is \
         non-deterministic; run again or increase max_padding_trials or \
         padding_novelty_growth_rate"
    )]
    PaddingExhausted(usize),
    #[error("[Menc-Error] Character {0:?} is not in the model alphabet")]
    NonAlphabetChar(char),
    #[error("[Menc-Error] Ciphertext of {0} bytes is shorter than one cipher block")]
    CiphertextShort(usize),
    #[error("[Menc-Error] Invalid config: {0}")]
    ConfigInvalid(String),
    #[error("[Menc-Error] Unable to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("[Menc-Error] Weights file invalid: {0}")]
    WeightsInvalid(String),
    #[error("[Menc-Error] {0}")]
    Io(#[from] std::io::Error),
}

/// Helper macro to bail out early with a `Reason` error
/// if any condition is true.
#[macro_export]
macro_rules! bail {
    ($expression:expr, $err:expr) => {
        if $expression {
            return Err($err);
        }
    };
    ( $( $cond:expr , $err:expr ),+ $(,)? ) => {
        $(
            if $cond {
                return Err($err);
            }
        )+
    };
}
