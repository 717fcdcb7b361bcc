//! Configuration for the slice plotter.
//!
//! [`PlotterConfig`] holds output settings (environment overridable);
//! [`PlotSpec`] is the YAML document describing the grid and its panels.

use std::path::{Path, PathBuf};

use renderer::{AxesProjection, ColorbarPlotGrid, GridOptions, SaveOptions};
use serde::{Deserialize, Serialize};
use slice_common::{Result, SliceError};
use tracing::{debug, info};

use crate::colormesh::ColormeshOptions;
use crate::geometry::Geometry;
use crate::plotter::{PlotOptions, SlicePlotter};
use crate::reader::{OutputTarget, SliceReader};

/// Output settings of a plotting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotterConfig {
    /// Pixels per inch of saved figures.
    pub dpi: u32,

    /// Number used in the file name of the first write.
    pub start_fig: i64,

    /// Crop saved figures to their content.
    pub bbox_tight: bool,

    /// TrueType font for labels; text is not drawn without one.
    pub font: Option<PathBuf>,

    /// Directory figures are written to.
    pub out_dir: PathBuf,

    /// File name prefix of saved figures.
    pub fig_name: String,

    /// Width of one grid column (inches).
    pub col_inch: f64,

    /// Height of one grid row (inches).
    pub row_inch: f64,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        let target = OutputTarget::default();
        let grid = GridOptions::default();
        Self {
            dpi: 200,
            start_fig: 1,
            bbox_tight: true,
            font: None,
            out_dir: target.out_dir,
            fig_name: target.fig_name,
            col_inch: grid.col_inch,
            row_inch: grid.row_inch,
        }
    }
}

impl PlotterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SLICES_DPI") {
            if let Ok(dpi) = val.parse() {
                config.dpi = dpi;
            }
        }

        if let Ok(val) = std::env::var("SLICES_START_FIG") {
            if let Ok(start) = val.parse() {
                config.start_fig = start;
            }
        }

        if let Ok(val) = std::env::var("SLICES_BBOX_TIGHT") {
            config.bbox_tight = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("SLICES_FONT") {
            if !val.is_empty() {
                config.font = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("SLICES_OUT_DIR") {
            config.out_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("SLICES_FIG_NAME") {
            config.fig_name = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.dpi == 0 {
            return Err("dpi must be > 0".to_string());
        }

        if self.fig_name.is_empty() {
            return Err("fig_name must not be empty".to_string());
        }

        if !(self.col_inch > 0.0 && self.row_inch > 0.0) {
            return Err("col_inch and row_inch must be > 0".to_string());
        }

        if let Some(font) = &self.font {
            if !font.is_file() {
                return Err(format!("font file not found: {}", font.display()));
            }
        }

        Ok(())
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget {
            out_dir: self.out_dir.clone(),
            fig_name: self.fig_name.clone(),
        }
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            start_fig: self.start_fig,
            save: SaveOptions {
                dpi: self.dpi,
                bbox_tight: self.bbox_tight,
            },
        }
    }

    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            col_inch: self.col_inch,
            row_inch: self.row_inch,
            font: self.font.clone(),
            ..GridOptions::default()
        }
    }
}

// ============================================================================
// Plot document
// ============================================================================

/// Projection of one cell of a custom grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub projection: AxesProjection,
}

/// Grid layout of a plot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub nrows: usize,
    pub ncols: usize,
    /// Projection of every cell of a regular grid
    #[serde(default)]
    pub projection: AxesProjection,
    #[serde(default)]
    pub col_inch: Option<f64>,
    #[serde(default)]
    pub row_inch: Option<f64>,
    /// Explicit cells; any cell not listed is left empty
    #[serde(default)]
    pub cells: Option<Vec<CellSpec>>,
}

/// One `add_*` call of a plot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelSpec {
    Colormesh {
        task: String,
        #[serde(default)]
        geometry: Geometry,
        #[serde(default)]
        options: ColormeshOptions,
    },
    Meridional {
        #[serde(default)]
        left: Option<String>,
        #[serde(default)]
        right: Option<String>,
        #[serde(default)]
        r_inner: Option<f64>,
        #[serde(default)]
        r_outer: Option<f64>,
        #[serde(default)]
        options: ColormeshOptions,
    },
    BallShell {
        #[serde(default)]
        ball: Option<String>,
        #[serde(default)]
        shell: Option<String>,
        #[serde(default)]
        r_inner: Option<f64>,
        #[serde(default)]
        r_outer: Option<f64>,
        #[serde(default)]
        options: ColormeshOptions,
    },
}

impl PanelSpec {
    /// Tasks this panel draws.
    pub fn tasks(&self) -> Vec<&str> {
        match self {
            PanelSpec::Colormesh { task, .. } => vec![task.as_str()],
            PanelSpec::Meridional { left, right, .. } => {
                left.iter().chain(right).map(String::as_str).collect()
            }
            PanelSpec::BallShell { ball, shell, .. } => {
                ball.iter().chain(shell).map(String::as_str).collect()
            }
        }
    }
}

/// YAML description of a figure: its grid and the panels filling it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub grid: GridSpec,
    pub panels: Vec<PanelSpec>,
}

impl PlotSpec {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(text)
            .map_err(|e| SliceError::config(format!("YAML error: {}", e)))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SliceError::Io(format!("{}: {}", path.display(), e)))?;
        let spec = Self::from_yaml_str(&text)?;
        info!(
            path = %path.display(),
            nrows = spec.grid.nrows,
            ncols = spec.grid.ncols,
            panels = spec.panels.len(),
            "Loaded plot document"
        );
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.nrows == 0 || self.grid.ncols == 0 {
            return Err(SliceError::config("grid needs at least one row and one column"));
        }
        if self.panels.is_empty() {
            return Err(SliceError::config("plot document has no panels"));
        }
        if let Some(cells) = &self.grid.cells {
            if let Some(cell) = cells
                .iter()
                .find(|c| c.row >= self.grid.nrows || c.col >= self.grid.ncols)
            {
                return Err(SliceError::GridCellNotFound(format!(
                    "cell ({}, {}) outside a {}x{} grid",
                    cell.row, cell.col, self.grid.nrows, self.grid.ncols
                )));
            }
        }
        if let Some(panel) = self.panels.iter().find(|p| p.tasks().is_empty()) {
            return Err(SliceError::config(format!("panel without tasks: {:?}", panel)));
        }
        Ok(())
    }

    /// Distinct tasks of every panel, in document order.
    pub fn tasks(&self) -> Vec<String> {
        let mut tasks: Vec<String> = Vec::new();
        for task in self.panels.iter().flat_map(PanelSpec::tasks) {
            if !tasks.iter().any(|t| t == task) {
                tasks.push(task.to_string());
            }
        }
        tasks
    }

    /// Set up the grid of `plotter` and add every panel.
    pub fn apply<R: SliceReader>(
        &self,
        plotter: &mut SlicePlotter<R>,
        options: &GridOptions,
    ) -> Result<()> {
        let mut options = options.clone();
        if let Some(col_inch) = self.grid.col_inch {
            options.col_inch = col_inch;
        }
        if let Some(row_inch) = self.grid.row_inch {
            options.row_inch = row_inch;
        }

        let (nrows, ncols) = (self.grid.nrows, self.grid.ncols);
        match &self.grid.cells {
            None => plotter.setup_grid(nrows, ncols, self.grid.projection, options)?,
            Some(cells) => {
                let grid = ColorbarPlotGrid::custom(nrows, ncols, options, |row, col| {
                    cells
                        .iter()
                        .find(|c| c.row == row && c.col == col)
                        .map(|c| c.projection)
                })?;
                plotter.use_custom_grid(grid);
            }
        }

        for panel in &self.panels {
            debug!(?panel, "Adding panel");
            match panel {
                PanelSpec::Colormesh {
                    task,
                    geometry,
                    options,
                } => plotter.add_geometry_colormesh(task, *geometry, options.clone())?,
                PanelSpec::Meridional {
                    left,
                    right,
                    r_inner,
                    r_outer,
                    options,
                } => plotter.add_meridional_colormesh(
                    left.as_deref(),
                    right.as_deref(),
                    *r_inner,
                    *r_outer,
                    options.clone(),
                )?,
                PanelSpec::BallShell {
                    ball,
                    shell,
                    r_inner,
                    r_outer,
                    options,
                } => plotter.add_ball_shell_polar_colormesh(
                    ball.as_deref(),
                    shell.as_deref(),
                    *r_inner,
                    *r_outer,
                    options.clone(),
                )?,
            }
        }
        Ok(())
    }
}
