//! Token-aware padding.
//!
//! Payloads are padded to a cipher-block multiple with a prefix of a token
//! the model itself would generate next, so the padded tail is as
//! on-distribution as the payload it follows. Unpadding only needs to find
//! the last token boundary again.

use rand::{CryptoRng, Rng};
use tracing::debug;

use crate::{
    Reason, bail,
    model::LanguageModel,
    modeling::{random_weights, recite},
    packing::BYTES_PER_WEIGHT,
};

/// Extends `values` with model-generated characters so that the whole
/// payload (the initial window, the normalizing and priming prefixes, and
/// `values`) fills a whole number of cipher blocks.
///
/// A boundary character is appended first when `values` does not already
/// end in one. Candidate padding is sampled as complete tokens following
/// `initial ‖ values`; each retry raises the novelty slightly, which
/// inflates the boundary probability enough to make a too-short token
/// progressively less likely. From the first token long enough, a prefix
/// length is chosen uniformly among all lengths that land on a block
/// boundary.
///
/// The returned payload always ends with a partial or complete token, with
/// or without its trailing boundary character.
///
/// Fails with [`Reason::BlockSizeInvalid`] unless `block_size` is positive
/// and a multiple of four, and with [`Reason::PaddingExhausted`] when no
/// trial produced a long-enough token. The latter is non-deterministic and
/// rare with any reasonable `max_padding_trials`.
pub fn pad<M, R>(
    model: &M,
    initial: &[char],
    values: &[char],
    block_size: usize,
    rng: &mut R,
) -> Result<Vec<char>, Reason>
where
    M: LanguageModel + ?Sized,
    R: Rng + CryptoRng + ?Sized,
{
    bail!(
        block_size == 0 || block_size % BYTES_PER_WEIGHT != 0,
        Reason::BlockSizeInvalid(block_size)
    );

    let mut values = values.to_vec();
    if values.last() != Some(&model.boundary()) {
        values.push(model.boundary());
    }

    let length = model.sequence_length()
        + model.normalizing_length()
        + model.priming_length()
        + values.len();
    let block_capacity = block_size / BYTES_PER_WEIGHT;
    let first_length = block_capacity - (length % block_capacity);

    let mut joined = initial.to_vec();
    joined.extend_from_slice(&values);

    for trial in 0..model.max_padding_trials() {
        let novelty = model.novelty() * model.padding_novelty_growth_rate().powi(trial as i32);
        let token = next_token(model, &joined, novelty, rng)?;

        if token.len() < first_length {
            debug!(
                trial,
                token_length = token.len(),
                needed = first_length,
                "padding token too short"
            );
            continue;
        }

        // Any prefix length a whole number of blocks past `first_length`
        // keeps the payload aligned.
        let count = (token.len() - first_length) / block_capacity + 1;
        let chosen = first_length + rng.gen_range(0..count) * block_capacity;
        values.extend_from_slice(&token[..chosen]);
        return Ok(values);
    }

    Err(Reason::PaddingExhausted(model.max_padding_trials()))
}

/// Removes the padding token that [`pad`] appended: the trailing boundary
/// character is dropped if present, then everything after the right-most
/// remaining boundary (that boundary itself stays). A payload without any
/// boundary comes back unchanged.
///
/// Exactly one trailing boundary is dropped. The padding tail contains at
/// most one boundary of its own (a token ends at its first), so dropping
/// more would eat into payloads that legitimately end in boundary runs.
pub fn unpad<M>(model: &M, values: &[char]) -> Vec<char>
where
    M: LanguageModel + ?Sized,
{
    let boundary = model.boundary();
    let trimmed = match values.last() {
        Some(&last) if last == boundary => &values[..values.len() - 1],
        _ => values,
    };
    drop_tail_until(boundary, trimmed)
}

/// Generates one random token following `start`: characters are recited
/// from random weights until a boundary appears.
///
/// Non-deterministic, and unbounded when the boundary probability is low,
/// though the table floor keeps every character reachable.
fn next_token<M, R>(
    model: &M,
    start: &[char],
    novelty: f64,
    rng: &mut R,
) -> Result<Vec<char>, Reason>
where
    M: LanguageModel + ?Sized,
    R: Rng + CryptoRng + ?Sized,
{
    let boundary = model.boundary();
    let mut stream = recite(model, start, random_weights(rng), Some(novelty));
    let mut token = Vec::new();

    loop {
        match stream.next() {
            Some(Ok(value)) => {
                token.push(value);
                if value == boundary {
                    return Ok(token);
                }
            }
            Some(Err(reason)) => return Err(reason),
            // The random weight stream is endless, so the recitation only
            // stops at a boundary.
            None => return Ok(token),
        }
    }
}

/// Drops the right-most elements of `xs` until `x` is found, keeping the
/// found element. Returns `xs` unchanged when `x` is absent.
fn drop_tail_until(x: char, xs: &[char]) -> Vec<char> {
    match xs.iter().rposition(|&value| value == x) {
        Some(index) => xs[..=index].to_vec(),
        None => xs.to_vec(),
    }
}
