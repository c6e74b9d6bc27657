//! Continuous percentile estimation.
//!
//! Matches SQL `PERCENTILE_CONT`: the values are sorted, the fractional rank
//! `p × (n − 1)` is computed, and the result is linearly interpolated between
//! the values at the floor and ceiling of that rank.

use crate::{Error, Result};

/// Interpolated percentile of `values` at `fraction` (0.0 ..= 1.0).
///
/// Returns `None` when `values` is empty.
pub fn percentile_cont(values: &[f64], fraction: f64) -> Result<Option<f64>> {
  if !(0.0..=1.0).contains(&fraction) {
    return Err(Error::InvalidPercentile(fraction));
  }
  if values.is_empty() {
    return Ok(None);
  }

  let mut sorted = values.to_vec();
  sorted.sort_by(f64::total_cmp);
  Ok(Some(interpolate(&sorted, fraction)))
}

/// Like [`percentile_cont`] for input that is already sorted ascending and
/// non-empty.
pub(crate) fn interpolate(sorted: &[f64], fraction: f64) -> f64 {
  let rank = fraction * (sorted.len() - 1) as f64;
  let lower = rank.floor() as usize;
  let upper = rank.ceil() as usize;
  if lower == upper {
    sorted[lower]
  } else {
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
  }
}
