//! Per-task datasets holding the writes assigned to one worker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SliceError};
use crate::field::Field2;

/// Time metadata attached to the leading (write) axis of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeScales {
    /// Simulation time of each write
    pub sim_time: Vec<f64>,
    /// Global write number of each write (1-based)
    pub write_number: Vec<i64>,
}

impl TimeScales {
    pub fn new(sim_time: Vec<f64>, write_number: Vec<i64>) -> Self {
        Self {
            sim_time,
            write_number,
        }
    }

    pub fn len(&self) -> usize {
        self.sim_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sim_time.is_empty()
    }
}

/// One task's output for a run of writes.
///
/// `values` holds every write back to back; each write has the per-write
/// `shape` (e.g. `[n_phi, n_r]` for a scalar or `[3, n_phi, n_r]` for a
/// vector). Size-1 axes are allowed and squeezed away by [`Dataset::field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    pub scales: TimeScales,
    #[serde(default)]
    pub bases: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    /// Create a dataset, validating that values and time scales agree.
    pub fn new(
        name: impl Into<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
        scales: TimeScales,
        bases: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let dataset = Self {
            name: name.into(),
            shape,
            values,
            scales,
            bases,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check internal consistency of the value buffer and time scales.
    pub fn validate(&self) -> Result<()> {
        if self.scales.sim_time.len() != self.scales.write_number.len() {
            return Err(SliceError::shape_mismatch(format!(
                "dataset '{}': {} sim_time entries but {} write_number entries",
                self.name,
                self.scales.sim_time.len(),
                self.scales.write_number.len()
            )));
        }
        let expected = self.writes() * self.write_size();
        if self.values.len() != expected {
            return Err(SliceError::shape_mismatch(format!(
                "dataset '{}': expected {} values for {} writes of shape {:?}, got {}",
                self.name,
                expected,
                self.writes(),
                self.shape,
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Number of writes held.
    pub fn writes(&self) -> usize {
        self.scales.len()
    }

    /// Number of values in a single write.
    pub fn write_size(&self) -> usize {
        self.shape.iter().product()
    }

    /// A dataset holding `count` consecutive writes starting at `start`.
    pub fn subset(&self, start: usize, count: usize) -> Result<Dataset> {
        if start + count > self.writes() {
            return Err(SliceError::WriteOutOfRange {
                dataset: self.name.clone(),
                index: start + count,
                writes: self.writes(),
            });
        }
        let size = self.write_size();
        let range = start..start + count;
        Ok(Dataset {
            name: self.name.clone(),
            shape: self.shape.clone(),
            values: self.values[start * size..(start + count) * size].to_vec(),
            scales: TimeScales::new(
                self.scales.sim_time[range.clone()].to_vec(),
                self.scales.write_number[range].to_vec(),
            ),
            bases: self.bases.clone(),
        })
    }

    /// Per-write shape with size-1 axes removed.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        self.shape.iter().copied().filter(|&n| n != 1).collect()
    }

    /// Extract the 2D field of write `index`.
    ///
    /// Size-1 axes are squeezed first. When `component` is given the first
    /// remaining axis is the vector component axis and is indexed away.
    pub fn field(&self, index: usize, component: Option<usize>) -> Result<Field2> {
        if index >= self.writes() {
            return Err(SliceError::WriteOutOfRange {
                dataset: self.name.clone(),
                index,
                writes: self.writes(),
            });
        }
        let size = self.write_size();
        let raw = &self.values[index * size..(index + 1) * size];
        let mut shape = self.squeezed_shape();

        let data = match component {
            Some(c) => {
                let components = shape.first().copied().unwrap_or(0);
                if c >= components {
                    return Err(SliceError::MissingComponent {
                        dataset: self.name.clone(),
                        index: c,
                        components,
                    });
                }
                shape.remove(0);
                let stride: usize = shape.iter().product();
                &raw[c * stride..(c + 1) * stride]
            }
            None => raw,
        };

        match shape.as_slice() {
            [n0, n1] => Field2::new(*n0, *n1, data.to_vec()),
            other => Err(SliceError::shape_mismatch(format!(
                "dataset '{}' does not yield a 2D field (squeezed shape {:?})",
                self.name, other
            ))),
        }
    }
}

/// Look up the coordinate values of a named basis.
pub fn match_basis<'a>(dataset: &'a Dataset, basis: &str) -> Result<&'a [f64]> {
    dataset
        .bases
        .get(basis)
        .map(Vec::as_slice)
        .ok_or_else(|| SliceError::missing_basis(&dataset.name, basis))
}
