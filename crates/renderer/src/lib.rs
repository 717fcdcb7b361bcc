//! Figure rendering for slice plots.
//!
//! - Colormaps and pseudocolor quad meshes
//! - Figures made of plotting axes and colorbar axes
//! - Grids of axes with a colorbar above each cell
//! - PNG output

pub mod canvas;
pub mod colormap;
pub mod error;
pub mod figure;
pub mod grid;
pub mod mesh;
pub mod png;
pub mod text;

pub use colormap::{Color, Colormap};
pub use error::{RenderError, Result};
pub use figure::{
    Axes, AxesProjection, Colorbar, ColorbarAxes, DataTransform, Figure, MeshHandle, MeshStyle,
    Rect, RenderCapabilities, SaveOptions,
};
pub use grid::{cell_key, ColorbarPlotGrid, GridOptions, PlotGrid};
pub use mesh::{QuadMesh, Shading};
pub use text::{format_sci, TextRenderer};

impl From<RenderError> for slice_common::SliceError {
    fn from(err: RenderError) -> Self {
        use slice_common::SliceError;
        match err {
            RenderError::ShapeMismatch(msg) => SliceError::ShapeMismatch(msg),
            RenderError::UnknownColormap(name) => SliceError::UnknownColormap(name),
            RenderError::UnsupportedProjection(msg) => SliceError::MissingCapability(msg),
            RenderError::AxesNotFound(key) => SliceError::GridCellNotFound(key),
            RenderError::Io(e) => SliceError::Io(e.to_string()),
            other => SliceError::Render(other.to_string()),
        }
    }
}
