//! Write iteration over task datasets.
//!
//! [`SliceReader`] is the interface the plotter consumes. [`MemoryReader`]
//! serves datasets held in memory (loaded from a JSON document), giving each
//! worker a contiguous block of writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slice_common::{Dataset, Result, SliceError};
use tracing::{debug, info};

/// Datasets of one write, keyed by task name.
pub type DatasetMap<'a> = BTreeMap<String, &'a Dataset>;

/// Source of per-write datasets for one worker.
pub trait SliceReader {
    /// Whether this worker has writes left to process.
    fn writes_remain(&self) -> bool;

    /// Datasets for `tasks` at the next write, plus the index of that write
    /// within each dataset. Advances the write cursor.
    fn get_dsets(&mut self, tasks: &[String]) -> Result<(DatasetMap<'_>, usize)>;

    /// Global 0-based index of the next write to be processed.
    fn current_write(&self) -> usize;

    /// Total writes across all workers.
    fn writes(&self) -> usize;

    fn out_dir(&self) -> &Path;

    fn fig_name(&self) -> &str;

    /// True when no writes are assigned to this worker.
    fn idle(&self) -> bool;
}

/// Contiguous block of writes assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAssignment {
    /// Global index of the first write
    pub start: usize,
    /// Number of writes
    pub count: usize,
}

/// Even-write distribution: `total` writes split into contiguous blocks,
/// the first `total % workers` workers taking one extra write.
pub fn distribute_writes(total: usize, rank: usize, workers: usize) -> WriteAssignment {
    let workers = workers.max(1);
    let base = total / workers;
    let extra = total % workers;
    let count = base + usize::from(rank < extra);
    let start = rank * base + rank.min(extra);
    WriteAssignment { start, count }
}

/// JSON document holding the datasets of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub datasets: Vec<Dataset>,
}

impl DatasetDocument {
    /// Read and validate a dataset document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SliceError::Io(format!("{}: {}", path.display(), e)))?;
        let document = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            datasets = document.datasets.len(),
            "Loaded dataset document"
        );
        Ok(document)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(text)?;
        for dset in &document.datasets {
            dset.validate()?;
        }
        Ok(document)
    }
}

/// Output location and name prefix of saved figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub out_dir: PathBuf,
    pub fig_name: String,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("snapshots"),
            fig_name: "snapshots".to_string(),
        }
    }
}

/// Reader over in-memory datasets.
#[derive(Debug, Clone)]
pub struct MemoryReader {
    datasets: BTreeMap<String, Dataset>,
    target: OutputTarget,
    assignment: WriteAssignment,
    total: usize,
    cursor: usize,
}

impl MemoryReader {
    /// Reader for worker `rank` of `workers`, holding only its own writes.
    ///
    /// Every dataset must hold the same number of writes.
    pub fn new(
        datasets: Vec<Dataset>,
        target: OutputTarget,
        rank: usize,
        workers: usize,
    ) -> Result<Self> {
        let total = datasets.first().map(Dataset::writes).unwrap_or(0);
        if let Some(other) = datasets.iter().find(|d| d.writes() != total) {
            return Err(SliceError::shape_mismatch(format!(
                "dataset '{}' holds {} writes, expected {}",
                other.name,
                other.writes(),
                total
            )));
        }

        let assignment = distribute_writes(total, rank, workers);
        let datasets = datasets
            .iter()
            .map(|d| Ok((d.name.clone(), d.subset(assignment.start, assignment.count)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        debug!(
            rank,
            workers,
            start = assignment.start,
            count = assignment.count,
            total,
            "Assigned writes"
        );

        Ok(Self {
            datasets,
            target,
            assignment,
            total,
            cursor: 0,
        })
    }

    /// Reader for a single worker.
    pub fn single(datasets: Vec<Dataset>, target: OutputTarget) -> Result<Self> {
        Self::new(datasets, target, 0, 1)
    }

    pub fn assignment(&self) -> WriteAssignment {
        self.assignment
    }

    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }
}

impl SliceReader for MemoryReader {
    fn writes_remain(&self) -> bool {
        self.cursor < self.assignment.count
    }

    fn get_dsets(&mut self, tasks: &[String]) -> Result<(DatasetMap<'_>, usize)> {
        if !self.writes_remain() {
            return Err(SliceError::WriteOutOfRange {
                dataset: tasks.first().cloned().unwrap_or_default(),
                index: self.cursor,
                writes: self.assignment.count,
            });
        }
        let index = self.cursor;
        self.cursor += 1;

        let mut dsets = DatasetMap::new();
        for task in tasks {
            let dset = self
                .datasets
                .get(task)
                .ok_or_else(|| SliceError::MissingTask(task.clone()))?;
            dsets.insert(task.clone(), dset);
        }
        Ok((dsets, index))
    }

    fn current_write(&self) -> usize {
        self.assignment.start + self.cursor
    }

    fn writes(&self) -> usize {
        self.total
    }

    fn out_dir(&self) -> &Path {
        &self.target.out_dir
    }

    fn fig_name(&self) -> &str {
        &self.target.fig_name
    }

    fn idle(&self) -> bool {
        self.assignment.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_cartesian_dataset;

    #[test]
    fn test_distribution_covers_every_write_once() {
        for total in 0..12 {
            for workers in 1..6 {
                let mut covered = Vec::new();
                for rank in 0..workers {
                    let a = distribute_writes(total, rank, workers);
                    covered.extend(a.start..a.start + a.count);
                }
                assert_eq!(
                    covered,
                    (0..total).collect::<Vec<_>>(),
                    "{} writes, {} workers",
                    total,
                    workers
                );
            }
        }
    }

    #[test]
    fn test_first_workers_take_extra_writes() {
        assert_eq!(distribute_writes(7, 0, 3), WriteAssignment { start: 0, count: 3 });
        assert_eq!(distribute_writes(7, 1, 3), WriteAssignment { start: 3, count: 2 });
        assert_eq!(distribute_writes(7, 2, 3), WriteAssignment { start: 5, count: 2 });
    }

    #[test]
    fn test_reader_iterates_local_writes() {
        let dset = create_cartesian_dataset("b", 4, 3, 5);
        let mut reader = MemoryReader::new(vec![dset], OutputTarget::default(), 1, 2).unwrap();
        assert_eq!(reader.assignment(), WriteAssignment { start: 3, count: 2 });
        assert_eq!(reader.writes(), 5);

        let tasks = vec!["b".to_string()];
        let mut seen = Vec::new();
        while reader.writes_remain() {
            let write = reader.current_write();
            let (dsets, ni) = reader.get_dsets(&tasks).unwrap();
            seen.push((write, ni, dsets["b"].scales.write_number[ni]));
        }
        assert_eq!(seen, vec![(3, 0, 4), (4, 1, 5)]);
        assert!(reader.get_dsets(&tasks).is_err());
    }

    #[test]
    fn test_idle_worker() {
        let dset = create_cartesian_dataset("b", 4, 3, 1);
        let reader = MemoryReader::new(vec![dset], OutputTarget::default(), 1, 2).unwrap();
        assert!(reader.idle());
        assert!(!reader.writes_remain());
    }

    #[test]
    fn test_missing_task() {
        let dset = create_cartesian_dataset("b", 4, 3, 1);
        let mut reader = MemoryReader::single(vec![dset], OutputTarget::default()).unwrap();
        assert!(matches!(
            reader.get_dsets(&["T".to_string()]),
            Err(SliceError::MissingTask(_))
        ));
    }

    #[test]
    fn test_mismatched_write_counts() {
        let a = create_cartesian_dataset("a", 4, 3, 2);
        let b = create_cartesian_dataset("b", 4, 3, 3);
        assert!(MemoryReader::single(vec![a, b], OutputTarget::default()).is_err());
    }

    #[test]
    fn test_document_round_trip() {
        let document = DatasetDocument {
            datasets: vec![create_cartesian_dataset("b", 2, 2, 1)],
        };
        let text = serde_json::to_string(&document).unwrap();
        let parsed = DatasetDocument::from_json_str(&text).unwrap();
        assert_eq!(parsed.datasets.len(), 1);
        assert_eq!(parsed.datasets[0].shape, vec![2, 2]);
        assert_eq!(parsed.datasets[0].scales.write_number, vec![1]);
        assert!(DatasetDocument::from_json_str(r#"{"datasets": [{"name": "x"}]}"#).is_err());
    }
}
