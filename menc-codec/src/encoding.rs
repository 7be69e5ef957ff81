//! The top-level codec between plaintext and weight bytes.
//!
//! An encoded payload is one weight stream in four segments: random weights
//! that build the model's initial window, random weights that normalize and
//! prime the model's predictive state, the weights tabulated from the
//! boundary-terminated plaintext, and the block-alignment padding. Decoding
//! recites the entire stream from an empty window, drops the prefix
//! characters, and unpads.

use rand::{CryptoRng, Rng};

use crate::{
    Reason,
    model::LanguageModel,
    modeling::{random_weights, recite, tabulate},
    packing::{pack_ints, unpack_ints},
    padding::{pad, unpad},
};

/// Encodes `plaintext` into a byte string of weights whose length is a
/// multiple of `block_size`.
///
/// A boundary character is appended to the plaintext when it does not end
/// in one. The random prefix weights are recited into characters first, so
/// the model window that tabulates the plaintext is exactly the window a
/// decoder reproduces from the same weights.
///
/// Fails with [`Reason::NonAlphabetChar`] when the plaintext contains a
/// character outside the model's alphabet, and propagates padding failures.
pub fn encode<M, R>(
    model: &M,
    plaintext: &str,
    block_size: usize,
    rng: &mut R,
) -> Result<Vec<u8>, Reason>
where
    M: LanguageModel + ?Sized,
    R: Rng + CryptoRng + ?Sized,
{
    let values: Vec<char> = plaintext.chars().collect();
    if let Some(&bad) = values.iter().find(|&value| !model.alphabet().contains(value)) {
        return Err(Reason::NonAlphabetChar(bad));
    }

    let prefix_length =
        model.sequence_length() + model.normalizing_length() + model.priming_length();
    let mut weights: Vec<u32> = random_weights(rng).take(prefix_length).collect();
    let prefix: Vec<char> = recite(model, &[], weights.iter().copied(), None)
        .collect::<Result<_, _>>()?;

    let padded = pad(model, &prefix, &values, block_size, rng)?;

    for weight in tabulate(model, &prefix, padded, None, rng) {
        weights.push(weight?);
    }

    Ok(pack_ints(&weights))
}

/// Decodes a byte string of weights back into the plaintext.
///
/// The weight stream is recited from an empty window, reproducing the
/// initial, normalizing and priming characters before the payload; those
/// prefix characters are dropped and the padding token is removed.
pub fn decode<M>(model: &M, data: &[u8]) -> Result<String, Reason>
where
    M: LanguageModel + ?Sized,
{
    let weights = unpack_ints(data)?;
    let recited: Vec<char> =
        recite(model, &[], weights, None).collect::<Result<_, _>>()?;

    let skip = model.sequence_length() + model.normalizing_length() + model.priming_length();
    let body = recited.get(skip..).unwrap_or(&[]);

    Ok(unpad(model, body).into_iter().collect())
}
