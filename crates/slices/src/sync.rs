//! Worker identity and synchronization between cooperating workers.

use std::sync::{Arc, Barrier};

use slice_common::{Result, SliceError};
use tracing::trace;

/// A barrier shared by every worker of a run.
pub trait Synchronizer: Send + Sync {
    /// Block until every worker has reached this point.
    fn barrier(&self);
}

/// Synchronizer for a single worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSync;

impl Synchronizer for NoSync {
    fn barrier(&self) {}
}

/// In-process synchronizer for workers running on threads.
#[derive(Debug)]
pub struct BarrierSync {
    barrier: Barrier,
}

impl BarrierSync {
    pub fn new(workers: usize) -> Self {
        Self {
            barrier: Barrier::new(workers),
        }
    }
}

impl Synchronizer for BarrierSync {
    fn barrier(&self) {
        self.barrier.wait();
    }
}

/// Identity of one worker and the synchronizer it shares with the others.
#[derive(Clone)]
pub struct WorkerContext {
    rank: usize,
    size: usize,
    sync: Arc<dyn Synchronizer>,
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl WorkerContext {
    pub fn new(rank: usize, size: usize, sync: Arc<dyn Synchronizer>) -> Result<Self> {
        if size == 0 || rank >= size {
            return Err(SliceError::config(format!(
                "worker rank {} out of range for {} workers",
                rank, size
            )));
        }
        Ok(Self { rank, size, sync })
    }

    /// The only worker of a run.
    pub fn single() -> Self {
        Self {
            rank: 0,
            size: 1,
            sync: Arc::new(NoSync),
        }
    }

    /// Contexts for `size` workers sharing one in-process barrier.
    pub fn group(size: usize) -> Vec<Self> {
        let sync: Arc<dyn Synchronizer> = Arc::new(BarrierSync::new(size));
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                sync: Arc::clone(&sync),
            })
            .collect()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Worker 0 performs shared filesystem setup and logs progress.
    pub fn is_lead(&self) -> bool {
        self.rank == 0
    }

    /// Enter a synchronized scope: waits for every worker now and again
    /// when the returned guard is dropped.
    pub fn scope(&self) -> SyncScope<'_> {
        trace!(rank = self.rank, "Entering sync scope");
        self.sync.barrier();
        SyncScope { ctx: self }
    }
}

/// Guard returned by [`WorkerContext::scope`].
#[must_use = "the scope ends when the guard is dropped"]
pub struct SyncScope<'a> {
    ctx: &'a WorkerContext,
}

impl Drop for SyncScope<'_> {
    fn drop(&mut self) {
        trace!(rank = self.ctx.rank, "Leaving sync scope");
        self.ctx.sync.barrier();
    }
}
