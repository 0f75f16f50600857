use crate::error::{InputError, Result};

/// Largest sample count a resampling may produce.
pub const MAX_SAMPLES: usize = 1 << 24;

/// Returns `ceil(length / step) + 1`, the number of samples that cover
/// `[0, length]` with a spacing of at most `step`.
///
/// # Errors
///
/// Returns `InputError::InvalidParameter` naming `parameter` if `step` is not
/// positive and finite, or if it would produce more than [`MAX_SAMPLES`]
/// samples.
pub fn sample_count(length: f64, step: f64, parameter: &'static str) -> Result<usize> {
    if !step.is_finite() || step <= 0.0 {
        return Err(InputError::InvalidParameter {
            parameter,
            value: step,
            reason: "must be positive and finite",
        }
        .into());
    }
    let intervals = (length.max(0.0) / step).ceil();
    #[allow(clippy::cast_precision_loss)]
    let limit = (MAX_SAMPLES - 1) as f64;
    if intervals > limit {
        return Err(InputError::InvalidParameter {
            parameter,
            value: step,
            reason: "is too small for the length to sample",
        }
        .into());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let intervals = intervals as usize;
    Ok(intervals + 1)
}

/// Returns `num` evenly spaced values over `[start, stop]`, both ends included.
///
/// `num == 1` yields `[start]`; `num == 0` yields an empty vector. The last
/// value is exactly `stop`.
#[must_use]
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let i = i as f64;
                    start + i * step
                })
                .collect();
            values[num - 1] = stop;
            values
        }
    }
}

/// Piecewise-linear interpolation of the samples `(xp, fp)` at every `x`.
///
/// `xp` must be non-decreasing. Queries outside `[xp[0], xp[last]]` are
/// clamped to the first or last sample value.
///
/// # Errors
///
/// - `InputError::LengthMismatch` if `xp` and `fp` differ in length
/// - `InputError::NotEnoughPoints` if no samples are given
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>> {
    if xp.len() != fp.len() {
        return Err(InputError::LengthMismatch {
            what: "interpolation sample values",
            expected: xp.len(),
            actual: fp.len(),
        }
        .into());
    }
    if xp.is_empty() {
        return Err(InputError::NotEnoughPoints(0).into());
    }
    Ok(x.iter().map(|&xi| interp_one(xi, xp, fp)).collect())
}

fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    // First sample strictly greater than x; in 1..=last because of the clamps above.
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let dx = xp[hi] - xp[lo];
    if dx <= 0.0 {
        return fp[lo];
    }
    fp[lo] + (x - xp[lo]) / dx * (fp[hi] - fp[lo])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_count_rounds_up() {
        assert_eq!(sample_count(10.0, 3.0, "step").unwrap(), 5);
        assert_eq!(sample_count(10.0, 2.0, "step").unwrap(), 6);
        assert_eq!(sample_count(0.0, 2.0, "step").unwrap(), 1);
    }

    #[test]
    fn sample_count_rejects_tiny_step() {
        match sample_count(100.0, 1e-300, "output_step") {
            Err(crate::TracklineError::Input(InputError::InvalidParameter {
                parameter, ..
            })) => assert_eq!(parameter, "output_step"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(sample_count(1.0, 0.0, "step").is_err());
        assert!(sample_count(1.0, f64::NAN, "step").is_err());
    }

    #[test]
    fn linspace_includes_both_ends() {
        let v = linspace(0.0, 10.0, 6);
        assert_eq!(v.len(), 6);
        for (i, x) in v.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = 2.0 * i as f64;
            assert_relative_eq!(*x, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 1.0, 1), vec![3.0]);
    }

    #[test]
    fn linspace_last_is_exact() {
        let v = linspace(0.0, 0.3, 7);
        assert_eq!(v[6], 0.3);
    }

    #[test]
    fn interp_inside_range() {
        let y = interp(&[0.5, 1.5], &[0.0, 1.0, 2.0], &[0.0, 10.0, 30.0]).unwrap();
        assert_relative_eq!(y[0], 5.0);
        assert_relative_eq!(y[1], 20.0);
    }

    #[test]
    fn interp_hits_samples() {
        let y = interp(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], &[4.0, 5.0, 7.0]).unwrap();
        assert_eq!(y, vec![4.0, 5.0, 7.0]);
    }

    #[test]
    fn interp_clamps_outside_range() {
        let y = interp(&[-1.0, 3.0], &[0.0, 2.0], &[1.0, 2.0]).unwrap();
        assert_relative_eq!(y[0], 1.0);
        assert_relative_eq!(y[1], 2.0);
    }

    #[test]
    fn interp_repeated_abscissa() {
        let y = interp(&[1.0], &[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 5.0, 6.0]).unwrap();
        assert!(y[0].is_finite());
    }

    #[test]
    fn interp_length_mismatch() {
        assert!(interp(&[0.0], &[0.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn interp_no_samples() {
        assert!(interp(&[0.0], &[], &[]).is_err());
    }
}
