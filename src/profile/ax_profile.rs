use crate::error::{InputError, Result};

/// Computes the longitudinal acceleration between consecutive velocity
/// samples, `a[i] = (v[i + 1]² - v[i]²) / (2 * el_lengths[i])`.
///
/// `vx` holds one sample more than `el_lengths`. The result has one entry per
/// element; with `eq_length_output` a trailing `0.0` is appended so that it
/// matches `vx` in length.
///
/// # Errors
///
/// Returns `InputError::LengthMismatch` unless `vx.len() == el_lengths.len() + 1`.
pub fn ax_profile(vx: &[f64], el_lengths: &[f64], eq_length_output: bool) -> Result<Vec<f64>> {
    if vx.len() != el_lengths.len() + 1 {
        return Err(InputError::LengthMismatch {
            what: "velocity profile",
            expected: el_lengths.len() + 1,
            actual: vx.len(),
        }
        .into());
    }

    let mut ax: Vec<f64> = vx
        .windows(2)
        .zip(el_lengths)
        .map(|(v, len)| (v[1] * v[1] - v[0] * v[0]) / (2.0 * len))
        .collect();
    if eq_length_output {
        ax.push(0.0);
    }
    Ok(ax)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::TracklineError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn constant_velocity_has_no_acceleration() {
        let ax = ax_profile(&[12.0; 5], &[2.0; 4], false).unwrap();
        assert_eq!(ax, vec![0.0; 4]);
    }

    #[test]
    fn accelerating_from_standstill() {
        let ax = ax_profile(&[0.0, 10.0], &[5.0], false).unwrap();
        assert_eq!(ax.len(), 1);
        assert_relative_eq!(ax[0], 10.0);
    }

    #[test]
    fn braking_is_negative() {
        let ax = ax_profile(&[20.0, 10.0, 0.0], &[15.0, 10.0], false).unwrap();
        assert_relative_eq!(ax[0], -10.0);
        assert_relative_eq!(ax[1], -5.0);
    }

    #[test]
    fn equal_length_output_pads_with_zero() {
        let ax = ax_profile(&[0.0, 10.0], &[5.0], true).unwrap();
        assert_eq!(ax.len(), 2);
        assert_relative_eq!(ax[0], 10.0);
        assert_abs_diff_eq!(ax[1], 0.0);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let result = ax_profile(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], false);
        assert!(matches!(
            result,
            Err(TracklineError::Input(InputError::LengthMismatch {
                expected: 4,
                actual: 3,
                ..
            }))
        ));
    }
}
