use heaplens_protocol::{Bin, StepPoint, Timestamp};
use thiserror::Error;

/// Series shorter than `factor * max_bins` points are passed through as-is.
pub const DEFAULT_DOWNSAMPLE_FACTOR: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownsampleError {
    #[error("cannot downsample over a zero-length horizon")]
    InvalidHorizon { horizon: Timestamp },
    #[error("cannot downsample into zero bins")]
    ZeroBins,
}

/// Compress a step series into `max_bins + 1` display bins over `[0, horizon]`,
/// using the default pass-through threshold.
pub fn downsample(
    series: &[StepPoint],
    max_bins: usize,
    horizon: Timestamp,
) -> Result<Vec<Bin>, DownsampleError> {
    downsample_with_factor(series, max_bins, horizon, DEFAULT_DOWNSAMPLE_FACTOR)
}

/// Compress a step series into `max_bins + 1` display bins over `[0, horizon]`.
///
/// Series with fewer than `factor * max_bins` points come back unchanged.
/// Otherwise bucket `i` (for `i` in `0..=max_bins`) has the upper bound
/// `i * horizon / max_bins`, and each point lands in the bucket with the
/// smallest bound `>= ts`. Membership is computed in exact integer
/// arithmetic, so a point sitting on a boundary always belongs to the bucket
/// that bound closes.
///
/// A non-empty bucket reports the mean of its points. An empty bucket
/// repeats the previous bucket's value, so flat stretches of the step
/// function stay flat instead of dropping to zero. Points past `horizon`
/// are outside the partition and ignored.
pub fn downsample_with_factor(
    series: &[StepPoint],
    max_bins: usize,
    horizon: Timestamp,
    factor: usize,
) -> Result<Vec<Bin>, DownsampleError> {
    if series.len() < factor.saturating_mul(max_bins) {
        return Ok(series.iter().copied().map(Bin::from).collect());
    }
    if max_bins == 0 {
        return Err(DownsampleError::ZeroBins);
    }
    if horizon == 0 {
        return Err(DownsampleError::InvalidHorizon { horizon });
    }

    let bins = max_bins as u128;
    let span = u128::from(horizon);

    // (count, sum) per bucket; sums in i128 so no bucket can overflow.
    let mut buckets: Vec<(u64, i128)> = vec![(0, 0); max_bins + 1];
    for point in series {
        if point.ts > horizon {
            continue;
        }
        let index = (u128::from(point.ts) * bins).div_ceil(span) as usize;
        let bucket = &mut buckets[index];
        bucket.0 += 1;
        bucket.1 += i128::from(point.value);
    }

    let mut carried = 0.0;
    let downsampled = buckets
        .into_iter()
        .enumerate()
        .map(|(i, (count, sum))| {
            if count > 0 {
                carried = sum as f64 / count as f64;
            }
            let ts = (i as u128 * span / bins) as Timestamp;
            Bin::new(ts, carried)
        })
        .collect();
    Ok(downsampled)
}
