//! Synthetic fields and datasets.
//!
//! These generators create predictable, verifiable data patterns that can
//! be used across the test suite.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use slice_common::{Dataset, Field2, TimeScales};

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|k| start + k as f64 * step).collect()
        }
    }
}

/// `n` evenly spaced values from `start`, excluding `stop`.
pub fn arange_open(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / n.max(1) as f64;
    (0..n).map(|k| start + k as f64 * step).collect()
}

/// Creates a field with predictable values.
///
/// Each element is `i * 1000 + j`, so `field.get(i, j)` can be checked
/// directly against its indices.
///
/// # Example
///
/// ```
/// use test_utils::create_test_field;
///
/// let f = create_test_field(3, 2);
/// assert_eq!(f.get(2, 1), 2001.0);
/// ```
pub fn create_test_field(n0: usize, n1: usize) -> Field2 {
    Field2::from_fn(n0, n1, |i, j| (i * 1000 + j) as f64)
}

/// Creates a field where every element equals `value`.
pub fn create_constant_field(n0: usize, n1: usize, value: f64) -> Field2 {
    Field2::from_fn(n0, n1, |_, _| value)
}

/// Creates a signed, smoothly varying field in roughly `[-amplitude, amplitude]`.
pub fn create_signed_field(n0: usize, n1: usize, amplitude: f64) -> Field2 {
    Field2::from_fn(n0, n1, |i, j| {
        let x = i as f64 / n0.max(1) as f64;
        let y = j as f64 / n1.max(1) as f64;
        amplitude * (2.0 * PI * x).sin() * (PI * y).cos()
    })
}

/// Creates a field with NaN at the listed `(i, j)` positions.
pub fn create_field_with_nans(n0: usize, n1: usize, nan_positions: &[(usize, usize)]) -> Field2 {
    let mut field = create_test_field(n0, n1);
    for &(i, j) in nan_positions {
        field.set(i, j, f64::NAN);
    }
    field
}

/// Time scales for `writes` consecutive writes starting at global write
/// `first_write`, with simulation times `0.1 * write_number`.
pub fn create_time_scales(writes: usize, first_write: i64) -> TimeScales {
    let write_number: Vec<i64> = (0..writes as i64).map(|k| first_write + k).collect();
    let sim_time = write_number.iter().map(|&n| 0.1 * n as f64).collect();
    TimeScales::new(sim_time, write_number)
}

/// A scalar dataset on two named bases.
///
/// Write `k` holds `value(k, i, j)` at basis indices `(i, j)`.
pub fn create_scalar_dataset(
    name: &str,
    (x_name, x): (&str, Vec<f64>),
    (y_name, y): (&str, Vec<f64>),
    scales: TimeScales,
    value: impl Fn(usize, usize, usize) -> f64,
) -> Dataset {
    let (n0, n1) = (x.len(), y.len());
    let mut values = Vec::with_capacity(scales.len() * n0 * n1);
    for k in 0..scales.len() {
        for i in 0..n0 {
            for j in 0..n1 {
                values.push(value(k, i, j));
            }
        }
    }
    let mut bases = BTreeMap::new();
    bases.insert(x_name.to_string(), x);
    bases.insert(y_name.to_string(), y);
    Dataset::new(name, vec![n0, n1], values, scales, bases)
        .expect("generated dataset is consistent")
}

/// A Cartesian box dataset on bases `x` in `[0, 4)` and `z` in `[-1, 1]`.
pub fn create_cartesian_dataset(name: &str, nx: usize, nz: usize, writes: usize) -> Dataset {
    create_scalar_dataset(
        name,
        ("x", arange_open(0.0, 4.0, nx)),
        ("z", linspace(-1.0, 1.0, nz)),
        create_time_scales(writes, 1),
        |k, i, j| (k + 1) as f64 * ((i as f64 * 0.7).sin() + j as f64 * 0.1),
    )
}

/// A disk dataset on bases `phi` in `[0, 2π)` and `r` in `(0, 1)`.
pub fn create_disk_dataset(name: &str, nphi: usize, nr: usize, writes: usize) -> Dataset {
    let r: Vec<f64> = (0..nr).map(|j| (j as f64 + 0.5) / nr as f64).collect();
    create_scalar_dataset(
        name,
        ("phi", arange_open(0.0, 2.0 * PI, nphi)),
        ("r", r),
        create_time_scales(writes, 1),
        |k, i, j| (k + 1) as f64 * (i as f64).cos() * (j + 1) as f64,
    )
}

/// A spherical surface dataset on bases `phi` in `[0, 2π)` and colatitude
/// `theta` in `(0, π)`.
pub fn create_sphere_dataset(name: &str, nphi: usize, ntheta: usize, writes: usize) -> Dataset {
    let theta: Vec<f64> = (0..ntheta).map(|j| PI * (j as f64 + 0.5) / ntheta as f64).collect();
    create_scalar_dataset(
        name,
        ("phi", arange_open(0.0, 2.0 * PI, nphi)),
        ("theta", theta),
        create_time_scales(writes, 1),
        |k, i, j| 1.0 + k as f64 + (i as f64 * 0.3).sin() * (j as f64 * 0.2).cos(),
    )
}

/// A meridional dataset on bases `theta` in `(0, π)` and `r` in `(0, 1)`,
/// with a singleton azimuth axis as written by an axisymmetric slice.
pub fn create_meridional_dataset(name: &str, ntheta: usize, nr: usize, writes: usize) -> Dataset {
    let theta: Vec<f64> = (0..ntheta).map(|j| PI * (j as f64 + 0.5) / ntheta as f64).collect();
    let r: Vec<f64> = (0..nr).map(|j| (j as f64 + 0.5) / nr as f64).collect();
    let scales = create_time_scales(writes, 1);
    let mut values = Vec::with_capacity(writes * ntheta * nr);
    for k in 0..writes {
        for i in 0..ntheta {
            for j in 0..nr {
                values.push((k + 1) as f64 * theta[i].cos() * r[j]);
            }
        }
    }
    let mut bases = BTreeMap::new();
    bases.insert("theta".to_string(), theta);
    bases.insert("r".to_string(), r);
    Dataset::new(name, vec![1, ntheta, nr], values, scales, bases)
        .expect("generated dataset is consistent")
}

/// A three-component vector dataset on bases `x` and `z`.
///
/// Component `c` of write `k` is `(c + 1) * 100 + k` everywhere.
pub fn create_vector_dataset(name: &str, nx: usize, nz: usize, writes: usize) -> Dataset {
    let mut values = Vec::with_capacity(writes * 3 * nx * nz);
    for k in 0..writes {
        for c in 0..3 {
            values.extend(std::iter::repeat(((c + 1) * 100 + k) as f64).take(nx * nz));
        }
    }
    let mut bases = BTreeMap::new();
    bases.insert("x".to_string(), arange_open(0.0, 4.0, nx));
    bases.insert("z".to_string(), linspace(-1.0, 1.0, nz));
    Dataset::new(name, vec![3, nx, nz], values, create_time_scales(writes, 1), bases)
        .expect("generated dataset is consistent")
}
