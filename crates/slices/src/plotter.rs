//! The slice plotter: panels assigned to grid cells, one figure per write.

use std::path::PathBuf;

use renderer::{
    cell_key, format_sci, AxesProjection, ColorbarPlotGrid, GridOptions, PlotGrid,
    RenderCapabilities, SaveOptions,
};
use slice_common::{Result, SliceError};
use tracing::{debug, info};

use crate::colormesh::{Colormesh, ColormeshOptions};
use crate::geometry::Geometry;
use crate::reader::SliceReader;
use crate::sync::WorkerContext;

/// Options for [`SlicePlotter::plot_colormeshes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    /// Number used in the file name of global write 1
    pub start_fig: i64,
    pub save: SaveOptions,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            start_fig: 1,
            save: SaveOptions::default(),
        }
    }
}

/// What one panel drew for a saved write.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReport {
    pub task: String,
    pub cell: String,
    pub vmin: f64,
    pub vmax: f64,
    pub tick_labels: Vec<String>,
}

/// One saved figure.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWrite {
    pub path: PathBuf,
    pub write_number: i64,
    pub sim_time: f64,
    pub panels: Vec<PanelReport>,
}

/// Plots colormeshes of 2D slices for every write held by a reader.
///
/// Each `add_*` call consumes one grid cell; cells are numbered
/// column-major over the grid (down the first column, then the next).
pub struct SlicePlotter<R: SliceReader> {
    reader: R,
    grid: Option<Box<dyn PlotGrid>>,
    panels: Vec<(usize, Colormesh)>,
    counter: usize,
    capabilities: RenderCapabilities,
}

impl<R: SliceReader> SlicePlotter<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capabilities(reader, RenderCapabilities::default())
    }

    pub fn with_capabilities(reader: R, capabilities: RenderCapabilities) -> Self {
        Self {
            reader,
            grid: None,
            panels: Vec::new(),
            counter: 0,
            capabilities,
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn grid(&self) -> Option<&dyn PlotGrid> {
        self.grid.as_deref()
    }

    pub fn panels(&self) -> impl Iterator<Item = (usize, &Colormesh)> {
        self.panels.iter().map(|(k, cm)| (*k, cm))
    }

    /// Use a regular grid with a colorbar above every axes.
    pub fn setup_grid(
        &mut self,
        nrows: usize,
        ncols: usize,
        projection: AxesProjection,
        options: GridOptions,
    ) -> Result<()> {
        let grid = ColorbarPlotGrid::new(nrows, ncols, projection, options)?;
        self.grid = Some(Box::new(grid));
        Ok(())
    }

    pub fn use_custom_grid(&mut self, grid: impl PlotGrid + 'static) {
        self.grid = Some(Box::new(grid));
    }

    /// Add panels that share the next grid cell.
    fn push_cell(&mut self, panels: Vec<Colormesh>) {
        let cell = self.counter;
        self.panels.extend(panels.into_iter().map(|cm| (cell, cm)));
        self.counter += 1;
    }

    fn panel(
        &self,
        task: &str,
        geometry: Geometry,
        options: ColormeshOptions,
    ) -> Result<Colormesh> {
        Colormesh::with_capabilities(task, geometry, options, &self.capabilities)
    }

    /// Add a panel of any geometry in its own cell.
    pub fn add_geometry_colormesh(
        &mut self,
        task: &str,
        geometry: Geometry,
        options: ColormeshOptions,
    ) -> Result<()> {
        let panel = self.panel(task, geometry, options)?;
        self.push_cell(vec![panel]);
        Ok(())
    }

    pub fn add_colormesh(&mut self, task: &str, options: ColormeshOptions) -> Result<()> {
        self.add_geometry_colormesh(task, Geometry::Cartesian, options)
    }

    pub fn add_cartesian_colormesh(&mut self, task: &str, options: ColormeshOptions) -> Result<()> {
        self.add_colormesh(task, options)
    }

    pub fn add_polar_colormesh(
        &mut self,
        task: &str,
        r_inner: Option<f64>,
        r_outer: Option<f64>,
        options: ColormeshOptions,
    ) -> Result<()> {
        self.add_geometry_colormesh(task, Geometry::polar(r_inner, r_outer), options)
    }

    pub fn add_mollweide_colormesh(&mut self, task: &str, options: ColormeshOptions) -> Result<()> {
        self.add_geometry_colormesh(task, Geometry::Mollweide, options)
    }

    /// Fails without geographic projection support.
    pub fn add_orthographic_colormesh(
        &mut self,
        task: &str,
        options: ColormeshOptions,
    ) -> Result<()> {
        self.add_geometry_colormesh(task, Geometry::Orthographic, options)
    }

    /// Left and right meridional halves in one cell. The left half has an
    /// empty colorbar label so the right half's label shows.
    pub fn add_meridional_colormesh(
        &mut self,
        left: Option<&str>,
        right: Option<&str>,
        r_inner: Option<f64>,
        r_outer: Option<f64>,
        options: ColormeshOptions,
    ) -> Result<()> {
        let mut panels = Vec::with_capacity(2);
        if let Some(task) = left {
            let left_options = ColormeshOptions {
                label: Some(String::new()),
                ..options.clone()
            };
            let geometry = Geometry::meridional(r_inner, r_outer, true);
            panels.push(self.panel(task, geometry, left_options)?);
        }
        if let Some(task) = right {
            panels.push(self.panel(task, Geometry::meridional(r_inner, r_outer, false), options)?);
        }
        self.push_cell(panels);
        Ok(())
    }

    /// A ball on `[0, r_inner]` and a shell on `[r_inner, r_outer]` in one
    /// cell.
    pub fn add_ball_shell_polar_colormesh(
        &mut self,
        ball: Option<&str>,
        shell: Option<&str>,
        r_inner: Option<f64>,
        r_outer: Option<f64>,
        options: ColormeshOptions,
    ) -> Result<()> {
        let mut panels = Vec::with_capacity(2);
        if let Some(task) = ball {
            panels.push(self.panel(task, Geometry::polar(Some(0.0), r_inner), options.clone())?);
        }
        if let Some(task) = shell {
            panels.push(self.panel(task, Geometry::polar(r_inner, r_outer), options)?);
        }
        self.push_cell(panels);
        Ok(())
    }

    /// Cell keys present in the grid, column-major.
    fn groom_grid(grid: &dyn PlotGrid) -> Vec<String> {
        let mut keys = Vec::new();
        for col in 0..grid.ncols() {
            for row in 0..grid.nrows() {
                let key = cell_key(row, col);
                if grid.has_cell(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Distinct tasks in panel order.
    fn tasks(&self) -> Vec<String> {
        let mut tasks: Vec<String> = Vec::new();
        for (_, cm) in &self.panels {
            if !tasks.iter().any(|t| t == cm.task()) {
                tasks.push(cm.task().to_string());
            }
        }
        tasks
    }

    /// Plot and save one figure per write assigned to this worker.
    ///
    /// Every worker must call this: the write loop runs inside a scope that
    /// waits for all workers on entry and exit, idle workers included.
    pub fn plot_colormeshes(
        &mut self,
        ctx: &WorkerContext,
        options: &PlotOptions,
    ) -> Result<Vec<RenderedWrite>> {
        let prepared = if ctx.is_lead() {
            std::fs::create_dir_all(self.reader.out_dir())
        } else {
            Ok(())
        };
        let _scope = ctx.scope();
        prepared?;

        let tasks = self.tasks();
        let Self {
            reader, grid, panels, ..
        } = self;
        let grid = grid
            .as_deref_mut()
            .ok_or_else(|| SliceError::config("no plot grid configured; call setup_grid first"))?;
        let keys = Self::groom_grid(grid);
        if let Some((cell, cm)) = panels.iter().find(|(cell, _)| *cell >= keys.len()) {
            return Err(SliceError::GridCellNotFound(format!(
                "panel '{}' needs cell {} but the grid has {}",
                cm.task(),
                cell,
                keys.len()
            )));
        }
        let Some(first_task) = tasks.first().cloned() else {
            return Err(SliceError::config("no colormeshes added"));
        };
        if reader.idle() {
            debug!(rank = ctx.rank(), "No writes assigned");
            return Ok(Vec::new());
        }

        let mut rendered = Vec::new();
        while reader.writes_remain() {
            if ctx.is_lead() {
                info!(
                    "writing plot {}/{} on worker {}",
                    reader.current_write() + 1,
                    reader.writes(),
                    ctx.rank()
                );
            }
            let out_dir = reader.out_dir().to_path_buf();
            let fig_name = reader.fig_name().to_string();
            let (dsets, ni) = reader.get_dsets(&tasks)?;
            let time = &dsets
                .get(&first_task)
                .ok_or_else(|| SliceError::MissingTask(first_task.clone()))?
                .scales;
            let (sim_time, write_number) = (time.sim_time[ni], time.write_number[ni]);

            let mut reports = Vec::with_capacity(panels.len());
            for (cell, cm) in panels.iter_mut() {
                let key = &keys[*cell];
                let dset = dsets
                    .get(cm.task())
                    .ok_or_else(|| SliceError::MissingTask(cm.task().to_string()))?;
                let (ax, cax) = grid.cell_mut(key)?;
                let (_, cb) = cm.plot(ax, cax, dset, ni)?;
                reports.push(PanelReport {
                    task: cm.task().to_string(),
                    cell: key.clone(),
                    vmin: cb.vmin,
                    vmax: cb.vmax,
                    tick_labels: cb.tick_labels,
                });
            }

            let figure = grid.figure_mut();
            figure.suptitle(format!("t = {}", format_sci(sim_time, 4)));
            let number = write_number + options.start_fig - 1;
            let path = out_dir.join(format!("{}_{:06}.png", fig_name, number));
            figure.savefig(&path, &options.save)?;
            figure.clear_all();

            rendered.push(RenderedWrite {
                path,
                write_number,
                sim_time,
                panels: reports,
            });
        }

        Ok(rendered)
    }
}
