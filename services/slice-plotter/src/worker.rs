//! One plotting worker.

use slice_common::{Dataset, Result};
use slices::{MemoryReader, PlotSpec, PlotterConfig, SlicePlotter, WorkerContext};
use tracing::{debug, info};

/// Inputs shared by every worker of a run.
pub struct Job<'a> {
    pub spec: &'a PlotSpec,
    pub config: &'a PlotterConfig,
    pub datasets: Vec<Dataset>,
}

/// Plot this worker's block of writes, returning the number of files saved.
pub fn run(ctx: &WorkerContext, job: Job<'_>) -> Result<usize> {
    let reader = MemoryReader::new(
        job.datasets,
        job.config.output_target(),
        ctx.rank(),
        ctx.size(),
    )?;
    debug!(rank = ctx.rank(), assignment = ?reader.assignment(), "Worker ready");

    let mut plotter = SlicePlotter::new(reader);
    job.spec.apply(&mut plotter, &job.config.grid_options())?;
    let rendered = plotter.plot_colormeshes(ctx, &job.config.plot_options())?;

    if let Some(last) = rendered.last() {
        info!(
            rank = ctx.rank(),
            count = rendered.len(),
            last = %last.path.display(),
            "Worker finished"
        );
    }
    Ok(rendered.len())
}
