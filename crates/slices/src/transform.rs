//! Field transformations applied before color mapping.

use serde::{Deserialize, Serialize};
use slice_common::Field2;

/// Which transformations to apply to each field.
///
/// At most one mean removal is applied, in the order `remove_mean`,
/// `remove_x_mean`, `remove_y_mean`. Division by the x mean and the log
/// scaling follow independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Subtract the mean of the whole field
    pub remove_mean: bool,
    /// Subtract the mean along the x axis
    pub remove_x_mean: bool,
    /// Subtract the mean along the y axis
    pub remove_y_mean: bool,
    /// Divide by the x mean of the absolute value
    pub divide_x_mean: bool,
    /// Replace the field by `log10(|f|)`
    pub log: bool,
}

impl TransformOptions {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `options` to `field`, returning a new field.
///
/// Non-finite results (division by a zero mean, log of zero) are kept.
pub fn transform(field: &Field2, options: &TransformOptions) -> Field2 {
    let [n0, n1] = field.shape();

    let mut out = if options.remove_mean {
        let mean = field.mean();
        field.map(|v| v - mean)
    } else if options.remove_x_mean {
        let means = field.mean_axis0();
        Field2::from_fn(n0, n1, |i, j| field.get(i, j) - means[j])
    } else if options.remove_y_mean {
        let means = field.mean_axis1();
        Field2::from_fn(n0, n1, |i, j| field.get(i, j) - means[i])
    } else {
        field.clone()
    };

    if options.divide_x_mean {
        let scale = out.map(f64::abs).mean_axis0();
        out = Field2::from_fn(n0, n1, |i, j| out.get(i, j) / scale[j]);
    }

    if options.log {
        out = out.map(|v| v.abs().log10());
    }

    out
}
