//! Regular grids of axes, each with a colorbar axes above it.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::figure::{Axes, AxesProjection, ColorbarAxes, Figure, Rect, RenderCapabilities};
use crate::text::TextRenderer;

/// Key of the axes in row `row`, column `col`.
pub fn cell_key(row: usize, col: usize) -> String {
    format!("ax_{}-{}", row, col)
}

/// A figure partitioned into addressable plotting cells.
///
/// Each cell key (see [`cell_key`]) names both a plotting axes and the
/// colorbar axes that belongs to it. Cells may be absent.
pub trait PlotGrid: Send {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn figure(&self) -> &Figure;
    fn figure_mut(&mut self) -> &mut Figure;

    fn has_cell(&self, key: &str) -> bool {
        self.figure().axes(key).is_some() && self.figure().cbar_axes(key).is_some()
    }

    /// The plotting axes and colorbar axes of one cell.
    fn cell_mut(&mut self, key: &str) -> Result<(&mut Axes, &mut ColorbarAxes)> {
        self.figure_mut().axes_pair_mut(key)
    }
}

/// Layout options for [`ColorbarPlotGrid`].
#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Width of one column (inches)
    pub col_inch: f64,
    /// Height of one row (inches)
    pub row_inch: f64,
    /// Padding around each cell as a fraction of the cell
    pub pad_fraction: f64,
    /// Height of the colorbar band as a fraction of the cell
    pub cbar_fraction: f64,
    /// TrueType font for tick labels, colorbar labels and titles
    pub font: Option<PathBuf>,
    pub capabilities: RenderCapabilities,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            col_inch: 3.0,
            row_inch: 3.0,
            pad_fraction: 0.05,
            cbar_fraction: 0.05,
            font: None,
            capabilities: RenderCapabilities::default(),
        }
    }
}

/// Regular rows x columns grid with a horizontal colorbar above each axes.
#[derive(Debug, Clone)]
pub struct ColorbarPlotGrid {
    nrows: usize,
    ncols: usize,
    figure: Figure,
}

impl ColorbarPlotGrid {
    /// Every cell uses the same projection.
    pub fn new(
        nrows: usize,
        ncols: usize,
        projection: AxesProjection,
        options: GridOptions,
    ) -> Result<Self> {
        Self::custom(nrows, ncols, options, |_, _| Some(projection))
    }

    /// Per-cell projections; cells mapped to `None` are left empty.
    pub fn custom(
        nrows: usize,
        ncols: usize,
        options: GridOptions,
        layout: impl Fn(usize, usize) -> Option<AxesProjection>,
    ) -> Result<Self> {
        let mut figure =
            Figure::new(ncols as f64 * options.col_inch, nrows as f64 * options.row_inch);
        if let Some(path) = &options.font {
            figure.set_font(Some(TextRenderer::from_file(path)?));
        }

        let pad = options.pad_fraction;
        let cbar = options.cbar_fraction;
        let gap = 2.0 * pad;
        for row in 0..nrows {
            for col in 0..ncols {
                let Some(projection) = layout(row, col) else {
                    continue;
                };
                options.capabilities.require(&projection)?;

                let key = cell_key(row, col);
                let cell_left = col as f64;
                let cell_bottom = (nrows - 1 - row) as f64;
                let axes_height = 1.0 - 2.0 * pad - cbar - gap;
                let to_figure = |left: f64, bottom: f64, width: f64, height: f64| {
                    Rect::new(
                        (cell_left + left) / ncols as f64,
                        (cell_bottom + bottom) / nrows as f64,
                        width / ncols as f64,
                        height / nrows as f64,
                    )
                };

                let axes_rect = to_figure(pad, pad, 1.0 - 2.0 * pad, axes_height);
                let cbar_rect = to_figure(pad, 1.0 - pad - cbar, 1.0 - 2.0 * pad, cbar);
                debug!(key = %key, projection = projection.name(), "Adding grid cell");
                figure.add_axes(Axes::new(key.clone(), axes_rect, projection));
                figure.add_cbar_axes(ColorbarAxes::new(key, cbar_rect));
            }
        }

        Ok(Self { nrows, ncols, figure })
    }
}

impl PlotGrid for ColorbarPlotGrid {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn figure(&self) -> &Figure {
        &self.figure
    }

    fn figure_mut(&mut self) -> &mut Figure {
        &mut self.figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[test]
    fn test_cell_keys_and_size() {
        let options = GridOptions::default();
        let grid = ColorbarPlotGrid::new(2, 3, AxesProjection::Rectilinear, options).unwrap();
        assert_eq!(grid.figure().size_inches(), (9.0, 6.0));
        assert!(grid.has_cell("ax_1-2"));
        assert!(!grid.has_cell("ax_2-0"));
        assert_eq!(grid.figure().axes_keys().count(), 6);
    }

    #[test]
    fn test_colorbar_sits_above_axes() {
        let grid =
            ColorbarPlotGrid::new(1, 1, AxesProjection::Polar, GridOptions::default()).unwrap();
        let ax = grid.figure().axes("ax_0-0").unwrap().rect();
        let fig = grid.figure();
        let cax = fig.cbar_axes("ax_0-0").unwrap();
        assert_eq!(cax.key(), "ax_0-0");
        assert!(ax.bottom + ax.height <= 0.95);
        assert!(ax.bottom > 0.0);
    }

    #[test]
    fn test_top_row_is_row_zero() {
        let options = GridOptions::default();
        let grid = ColorbarPlotGrid::new(2, 1, AxesProjection::Rectilinear, options).unwrap();
        let top = grid.figure().axes("ax_0-0").unwrap().rect();
        let bottom = grid.figure().axes("ax_1-0").unwrap().rect();
        assert!(top.bottom > bottom.bottom);
    }

    #[test]
    fn test_custom_layout_skips_cells() {
        let grid = ColorbarPlotGrid::custom(1, 2, GridOptions::default(), |_, col| {
            (col == 1).then_some(AxesProjection::Mollweide)
        })
        .unwrap();
        assert!(!grid.has_cell("ax_0-0"));
        assert!(grid.has_cell("ax_0-1"));
    }

    #[test]
    fn test_geographic_cells_need_capability() {
        let options = GridOptions {
            capabilities: RenderCapabilities { geographic: false },
            ..GridOptions::default()
        };
        let ortho = AxesProjection::Orthographic {
            central_longitude: 0.0,
            central_latitude: 30.0,
        };
        assert!(matches!(
            ColorbarPlotGrid::new(1, 1, ortho, options),
            Err(RenderError::UnsupportedProjection(_))
        ));
    }
}
