//! Little-endian serialization of weight streams.

use crate::{Reason, bail};

/// Number of bytes a single weight occupies on the wire.
pub const BYTES_PER_WEIGHT: usize = 4;

/// The largest representable weight.
pub const MAX_WEIGHT: u32 = u32::MAX;

/// Serializes a list of 32-bit weights into a byte string, little-endian,
/// four bytes per weight.
///
/// # Example
///
/// ```rust
/// assert_eq!(
///     menc_codec::pack_ints(&[1, 2]),
///     [1, 0, 0, 0, 2, 0, 0, 0]
/// );
/// ```
pub fn pack_ints(weights: &[u32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(weights.len() * BYTES_PER_WEIGHT);
    for weight in weights {
        data.extend_from_slice(&weight.to_le_bytes());
    }
    data
}

/// Deserializes a byte string back into 32-bit weights.
///
/// Fails with [`Reason::BadLength`] when the buffer is not a multiple of
/// four bytes.
pub fn unpack_ints(data: &[u8]) -> Result<Vec<u32>, Reason> {
    bail!(
        data.len() % BYTES_PER_WEIGHT != 0,
        Reason::BadLength(data.len())
    );

    Ok(data
        .chunks_exact(BYTES_PER_WEIGHT)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{pack_ints, unpack_ints};
    use crate::Reason;

    #[test]
    fn round_trip() {
        for weights in [vec![], vec![1], vec![1, 2], vec![1, 2, 3], vec![u32::MAX, 0]] {
            assert_eq!(unpack_ints(&pack_ints(&weights)).unwrap(), weights);
        }
    }

    #[test]
    fn ragged_buffers_are_rejected() {
        for length in [1, 2, 3, 5, 7] {
            let data = vec![0u8; length];
            assert!(matches!(unpack_ints(&data), Err(Reason::BadLength(n)) if n == length));
        }
    }
}
