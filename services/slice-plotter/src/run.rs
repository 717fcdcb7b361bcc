//! Configuration resolution and the worker pool of a plotting run.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use slices::{DatasetDocument, PlotSpec, PlotterConfig, WorkerContext};
use tracing::info;

use crate::worker::{self, Job};

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out_dir: Option<PathBuf>,
    pub fig_name: Option<String>,
    pub start_fig: Option<i64>,
    pub dpi: Option<u32>,
}

/// Apply `overrides` on top of `base` and validate the result.
pub fn resolve_config(base: PlotterConfig, overrides: Overrides) -> Result<PlotterConfig> {
    let mut config = base;
    if let Some(out_dir) = overrides.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(fig_name) = overrides.fig_name {
        config.fig_name = fig_name;
    }
    if let Some(start_fig) = overrides.start_fig {
        config.start_fig = start_fig;
    }
    if let Some(dpi) = overrides.dpi {
        config.dpi = dpi;
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

/// Every task of the plot document must be present in the dataset document.
pub fn check_tasks(spec: &PlotSpec, document: &DatasetDocument) -> Result<()> {
    for task in spec.tasks() {
        if !document.datasets.iter().any(|d| d.name == task) {
            return Err(anyhow!(
                "plot document uses task '{}' missing from the dataset document",
                task
            ));
        }
    }
    Ok(())
}

/// Run `workers` cooperating workers on scoped threads.
///
/// Returns the number of figures saved across all workers.
pub fn run_workers(
    spec: &PlotSpec,
    config: &PlotterConfig,
    document: &DatasetDocument,
    workers: usize,
) -> Result<usize> {
    if workers == 0 {
        return Err(anyhow!("at least one worker is required"));
    }
    check_tasks(spec, document)?;

    let contexts = WorkerContext::group(workers);
    let results: Vec<Result<usize>> = std::thread::scope(|s| {
        let handles: Vec<_> = contexts
            .iter()
            .map(|ctx| {
                let job = Job {
                    spec,
                    config,
                    datasets: document.datasets.clone(),
                };
                s.spawn(move || worker::run(ctx, job))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result.map_err(anyhow::Error::from),
                Err(_) => Err(anyhow!("worker panicked")),
            })
            .collect()
    });

    let mut written = 0;
    for (rank, result) in results.into_iter().enumerate() {
        written += result.with_context(|| format!("worker {} failed", rank))?;
    }
    info!(written, out_dir = %config.out_dir.display(), "Finished plotting");
    Ok(written)
}
