//! Color limits from a field's value distribution.

use std::cmp::Ordering;

use slice_common::{Field2, Result, SliceError};

/// Lower percentile used for negative positive-definite fields.
const LOW_PERCENTILE: f64 = 0.002;
/// Upper percentile used for every other case.
const HIGH_PERCENTILE: f64 = 0.998;

/// Color limits of one mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLimits {
    pub vmin: f64,
    pub vmax: f64,
}

/// Ascending order with NaN last.
fn nan_last(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

/// Element of sorted `values` at fraction `q` of the length.
fn percentile(values: &[f64], q: f64) -> f64 {
    let index = ((q * values.len() as f64) as usize).min(values.len() - 1);
    values[index]
}

/// Compute color limits for `field`.
///
/// Signed fields get limits symmetric about zero at the 99.8th percentile
/// of `|f|`. Positive-definite fields span from zero to the 99.8th
/// percentile, or from the 0.2th percentile to zero when their mean is
/// negative. `vmin`/`vmax` overrides replace the computed bounds.
pub fn limits(
    field: &Field2,
    pos_def: bool,
    vmin: Option<f64>,
    vmax: Option<f64>,
) -> Result<ColorLimits> {
    if field.is_empty() {
        return Err(SliceError::EmptyField);
    }

    let mut computed = if pos_def {
        let mut values = field.as_slice().to_vec();
        values.sort_by(nan_last);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        if mean < 0.0 {
            ColorLimits {
                vmin: percentile(&values, LOW_PERCENTILE),
                vmax: 0.0,
            }
        } else {
            ColorLimits {
                vmin: 0.0,
                vmax: percentile(&values, HIGH_PERCENTILE),
            }
        }
    } else {
        let mut magnitudes: Vec<f64> = field.as_slice().iter().map(|v| v.abs()).collect();
        magnitudes.sort_by(nan_last);
        let vmax = percentile(&magnitudes, HIGH_PERCENTILE);
        ColorLimits { vmin: -vmax, vmax }
    };

    if let Some(v) = vmin {
        computed.vmin = v;
    }
    if let Some(v) = vmax {
        computed.vmax = v;
    }
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::distributions;

    fn field(values: Vec<f64>) -> Field2 {
        let n = values.len();
        Field2::new(1, n, values).unwrap()
    }

    #[test]
    fn test_signed_limits_are_symmetric() {
        let lim = limits(&field(distributions::signed_with_outlier()), false, None, None).unwrap();
        assert_eq!(lim.vmin, -lim.vmax);
        // |values| sorted: 0, 1, 1, ..., 499, 499, 1e6; index 998 is 499
        assert_eq!(lim.vmax, 499.0);
    }

    #[test]
    fn test_positive_definite_with_positive_mean() {
        let lim = limits(&field(distributions::ramp_1000()), true, None, None).unwrap();
        assert_eq!(lim.vmin, 0.0);
        assert_eq!(lim.vmax, 999.0);
    }

    #[test]
    fn test_positive_definite_with_negative_mean() {
        let lim = limits(&field(distributions::negative_ramp()), true, None, None).unwrap();
        // sorted ascending: -1000, -999, -998, ...; index 2
        assert_eq!(lim.vmin, -998.0);
        assert_eq!(lim.vmax, 0.0);
    }

    #[test]
    fn test_manual_overrides_win() {
        let f = field(distributions::ramp_1000());
        let lim = limits(&f, false, Some(-3.5), None).unwrap();
        assert_eq!(lim.vmin, -3.5);
        assert_eq!(lim.vmax, 999.0);

        let lim = limits(&f, true, Some(10.0), Some(20.0)).unwrap();
        assert_eq!(lim, ColorLimits { vmin: 10.0, vmax: 20.0 });
    }

    #[test]
    fn test_single_value() {
        let lim = limits(&field(vec![-4.0]), false, None, None).unwrap();
        assert_eq!(lim, ColorLimits { vmin: -4.0, vmax: 4.0 });
    }

    #[test]
    fn test_nan_sorts_last() {
        let mut values = vec![f64::NAN; 10];
        values.extend((1..=990).map(|v| v as f64));
        let lim = limits(&field(values), false, None, None).unwrap();
        // index 998 of 1000 falls in the NaN tail
        assert!(lim.vmax.is_nan());

        let mut values = vec![f64::NAN; 1];
        values.extend((1..=999).map(|v| v as f64));
        let lim = limits(&field(values), false, None, None).unwrap();
        assert_eq!(lim.vmax, 999.0);
    }

    #[test]
    fn test_empty_field_is_an_error() {
        let empty = Field2::new(0, 3, Vec::new()).unwrap();
        assert!(matches!(limits(&empty, false, None, None), Err(SliceError::EmptyField)));
    }
}
