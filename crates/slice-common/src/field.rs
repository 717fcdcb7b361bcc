//! Two-dimensional numeric arrays.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SliceError};

/// A 2D `f64` array stored in row-major order.
///
/// Axis 0 is the plot's x basis and axis 1 its y basis, so `get(i, j)` is
/// the sample at x index `i` and y index `j`. The same type carries mesh
/// coordinate grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field2 {
    shape: [usize; 2],
    data: Vec<f64>,
}

impl Field2 {
    /// Create a field from row-major data.
    pub fn new(n0: usize, n1: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n0 * n1 {
            return Err(SliceError::shape_mismatch(format!(
                "expected {}x{} = {} values, got {}",
                n0,
                n1,
                n0 * n1,
                data.len()
            )));
        }
        Ok(Self { shape: [n0, n1], data })
    }

    /// Build a field by evaluating `f(i, j)` at every index.
    pub fn from_fn(n0: usize, n1: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n0 * n1);
        for i in 0..n0 {
            for j in 0..n1 {
                data.push(f(i, j));
            }
        }
        Self { shape: [n0, n1], data }
    }

    pub fn zeros(n0: usize, n1: usize) -> Self {
        Self {
            shape: [n0, n1],
            data: vec![0.0; n0 * n1],
        }
    }

    /// Outer-product grid: `xx[i][j] = x[i]`, `yy[i][j] = y[j]`.
    pub fn meshgrid(x: &[f64], y: &[f64]) -> (Self, Self) {
        let xx = Self::from_fn(x.len(), y.len(), |i, _| x[i]);
        let yy = Self::from_fn(x.len(), y.len(), |_, j| y[j]);
        (xx, yy)
    }

    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.shape[1] + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let n1 = self.shape[1];
        self.data[i * n1 + j] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` element-wise, producing a new field.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            shape: self.shape,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Arithmetic mean of every element (NaN if any element is NaN).
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return f64::NAN;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Mean over axis 0; one value per index of axis 1.
    pub fn mean_axis0(&self) -> Vec<f64> {
        let [n0, n1] = self.shape;
        let mut sums = vec![0.0; n1];
        for i in 0..n0 {
            for (j, sum) in sums.iter_mut().enumerate() {
                *sum += self.get(i, j);
            }
        }
        sums.iter().map(|s| s / n0 as f64).collect()
    }

    /// Mean over axis 1; one value per index of axis 0.
    pub fn mean_axis1(&self) -> Vec<f64> {
        let n1 = self.shape[1];
        self.data
            .chunks(n1.max(1))
            .map(|row| row.iter().sum::<f64>() / n1 as f64)
            .collect()
    }

    /// Edge padding: repeat boundary rows/columns.
    ///
    /// `(before0, after0)` rows are added along axis 0 and `(before1, after1)`
    /// columns along axis 1, each copying the nearest existing value.
    pub fn pad_edge(&self, axis0: (usize, usize), axis1: (usize, usize)) -> Self {
        let [n0, n1] = self.shape;
        if n0 == 0 || n1 == 0 {
            return self.clone();
        }
        let m0 = n0 + axis0.0 + axis0.1;
        let m1 = n1 + axis1.0 + axis1.1;
        Self::from_fn(m0, m1, |i, j| {
            let si = i.saturating_sub(axis0.0).min(n0 - 1);
            let sj = j.saturating_sub(axis1.0).min(n1 - 1);
            self.get(si, sj)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Field2::new(2, 3, vec![0.0; 5]).is_err());
        assert!(Field2::new(2, 3, vec![0.0; 6]).is_ok());
    }

    #[test]
    fn test_meshgrid_orientation() {
        let (xx, yy) = Field2::meshgrid(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!(xx.shape(), [3, 2]);
        assert_eq!(xx.get(2, 0), 3.0);
        assert_eq!(xx.get(2, 1), 3.0);
        assert_eq!(yy.get(0, 1), 20.0);
        assert_eq!(yy.get(2, 1), 20.0);
    }

    #[test]
    fn test_axis_means() {
        // [[1, 2], [3, 4], [5, 6]]
        let f = Field2::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(f.mean_axis0(), vec![3.0, 4.0]);
        assert_eq!(f.mean_axis1(), vec![1.5, 3.5, 5.5]);
        assert_eq!(f.mean(), 3.5);
    }

    #[test]
    fn test_pad_edge() {
        // [[1, 2], [3, 4]]
        let f = Field2::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let p = f.pad_edge((0, 1), (1, 0));
        assert_eq!(p.shape(), [3, 3]);
        assert_eq!(
            p.as_slice(),
            &[1.0, 1.0, 2.0, 3.0, 3.0, 4.0, 3.0, 3.0, 4.0]
        );
    }
}
