//! Weighted sampling over an ordered choice list.
//!
//! The two functions here are exact inverses of each other: a weight picks
//! the choice whose cumulative interval contains it, and a choice picks a
//! random weight from its own interval. The whole codec rests on that
//! duality.

use rand::{CryptoRng, Rng};

use crate::{Reason, bail};

/// Picks the choice corresponding to `weight`.
///
/// This is a normal weighted sample except that the chosen weight is
/// provided instead of being drawn. Giving an item a weight of `N` is
/// equivalent to repeating it `N` times in a uniform sample: with choices
/// `["A", "B"]` and weights `[2, 3]` the weights `0, 1` map to `"A"` and
/// `2, 3, 4` map to `"B"`.
///
/// Fails with [`Reason::LengthMismatch`] when the lists differ in length
/// and with [`Reason::OutOfRange`] when `weight` is not below the sum of
/// all weights.
///
/// # Example
///
/// ```rust
/// use menc_codec::choose_choice;
///
/// assert_eq!(*choose_choice(0, &["A", "B", "C"], &[1, 2, 3]).unwrap(), "A");
/// assert_eq!(*choose_choice(1, &["A", "B", "C"], &[1, 2, 3]).unwrap(), "B");
/// assert_eq!(*choose_choice(3, &["A", "B", "C"], &[1, 2, 3]).unwrap(), "C");
/// ```
pub fn choose_choice<'a, T>(weight: u32, choices: &'a [T], weights: &[u32]) -> Result<&'a T, Reason> {
    bail!(
        weights.len() != choices.len(),
        Reason::LengthMismatch {
            choices: choices.len(),
            weights: weights.len(),
        }
    );

    let mut total = 0u64;
    for (choice, &w) in choices.iter().zip(weights) {
        total += u64::from(w);
        if u64::from(weight) < total {
            return Ok(choice);
        }
    }

    Err(Reason::OutOfRange { weight, total })
}

/// Generates a random weight that maps back to `choice`.
///
/// This is the opposite of [`choose_choice`]: each choice owns a
/// contiguous interval of weights, and this draws uniformly from the
/// interval of the first occurrence of `choice`.
///
/// Returns `None` when the interval is empty (the choice has zero
/// weight). Fails with [`Reason::LengthMismatch`] when the lists differ
/// in length and with [`Reason::ChoiceMissing`] when `choice` is not in
/// `choices` at all.
///
/// The round trip always holds for positive weights:
///
/// ```rust
/// use menc_codec::{choose_choice, choose_weight};
/// use rand::rngs::OsRng;
///
/// let weight = choose_weight(&"B", &["A", "B", "C"], &[1, 2, 3], &mut OsRng)
///     .unwrap()
///     .unwrap();
/// assert_eq!(*choose_choice(weight, &["A", "B", "C"], &[1, 2, 3]).unwrap(), "B");
/// ```
pub fn choose_weight<T, R>(
    choice: &T,
    choices: &[T],
    weights: &[u32],
    rng: &mut R,
) -> Result<Option<u32>, Reason>
where
    T: PartialEq,
    R: Rng + CryptoRng + ?Sized,
{
    bail!(
        weights.len() != choices.len(),
        Reason::LengthMismatch {
            choices: choices.len(),
            weights: weights.len(),
        }
    );

    let (mut start, mut end) = (0u64, 0u64);
    let mut found = false;
    for (candidate, &w) in choices.iter().zip(weights) {
        start = end;
        end += u64::from(w);
        if candidate == choice {
            found = true;
            break;
        }
    }

    bail!(!found, Reason::ChoiceMissing);

    if start == end {
        return Ok(None);
    }

    Ok(Some(rng.gen_range(start..end) as u32))
}
