//! Probability-vector helpers behind every per-step weight table.

/// Normalizes a list of values so they sum to 1.0, while skewing the
/// distribution by `temperature` to amplify or suppress the distance
/// between entries.
///
/// A large `temperature` pushes the result towards uniform; a small one
/// concentrates the mass on the largest entry. Zero entries stay zero
/// (`ln(0)` is treated as negative infinity).
///
/// # Example
///
/// ```rust
/// let normalized = menc_codec::log_normalize(&[1.0, 2.0, 3.0], 1.0);
/// assert!((normalized[0] - 1.0 / 6.0).abs() < 1e-9);
/// assert!((normalized[2] - 3.0 / 6.0).abs() < 1e-9);
/// ```
pub fn log_normalize(values: &[f64], temperature: f64) -> Vec<f64> {
    let exponentiated: Vec<f64> = values
        .iter()
        .map(|value| (value.ln() / temperature).exp())
        .collect();
    let total: f64 = exponentiated.iter().sum();

    if total > 0.0 {
        return exponentiated.into_iter().map(|e| e / total).collect();
    }

    // Deep temperatures can underflow every entry at once. The peak keeps
    // the whole mass in that case.
    let mut normalized = vec![0.0; values.len()];
    if let Some(peak) = argmax_f64(values) {
        normalized[peak] = 1.0;
    }
    normalized
}

/// Scales a list of values summing to 1.0 into integer weights summing to
/// exactly `total`, keeping their relative ratios up to rounding.
///
/// `lowest` puts a floor under every entry, so near-zero probabilities
/// still receive weight. Whatever rounding slack remains is absorbed by
/// the largest entry (first one on ties).
///
/// # Example
///
/// ```rust
/// assert_eq!(menc_codec::scale(&[0.5, 0.5], 10, 0), [5, 5]);
/// assert_eq!(menc_codec::scale(&[0.0, 0.5], 10, 0), [0, 10]);
/// assert_eq!(menc_codec::scale(&[0.0, 0.5], 10, 1), [1, 9]);
/// ```
pub fn scale(values: &[f64], total: u64, lowest: u32) -> Vec<u32> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut scaled: Vec<i64> = values
        .iter()
        .map(|p| (p * total as f64).round().max(f64::from(lowest)) as i64)
        .collect();

    let delta = total as i64 - scaled.iter().sum::<i64>();
    let peak = argmax_i64(&scaled);
    scaled[peak] += delta;

    scaled.into_iter().map(|weight| weight as u32).collect()
}

fn argmax_f64(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

fn argmax_i64(values: &[i64]) -> usize {
    let mut peak = 0;
    for (index, &value) in values.iter().enumerate() {
        if value > values[peak] {
            peak = index;
        }
    }
    peak
}
