//! Colormesh plots of 2D slices from simulation output.
//!
//! A [`SlicePlotter`] assigns colormesh panels to the cells of a plot grid and
//! saves one PNG per write served by a [`SliceReader`]. Panels differ by
//! [`Geometry`]: Cartesian boxes, polar disks and annuli, meridional half
//! disks, and Mollweide or orthographic maps of a sphere.
//!
//! # Example
//!
//! ```no_run
//! use renderer::{AxesProjection, GridOptions};
//! use slices::{
//!     ColormeshOptions, DatasetDocument, MemoryReader, OutputTarget, PlotOptions, SlicePlotter,
//!     WorkerContext,
//! };
//!
//! # fn main() -> slice_common::Result<()> {
//! let document = DatasetDocument::from_json_file("slices.json")?;
//! let reader = MemoryReader::single(document.datasets, OutputTarget::default())?;
//! let mut plotter = SlicePlotter::new(reader);
//! plotter.setup_grid(1, 1, AxesProjection::Rectilinear, GridOptions::default())?;
//! plotter.add_colormesh("b", ColormeshOptions::default())?;
//! plotter.plot_colormeshes(&WorkerContext::single(), &PlotOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod colormesh;
pub mod config;
pub mod geometry;
pub mod limits;
pub mod plotter;
pub mod reader;
pub mod sync;
pub mod transform;

pub use colormesh::{Colormesh, ColormeshOptions, PanelState};
pub use config::{CellSpec, GridSpec, PanelSpec, PlotSpec, PlotterConfig};
pub use geometry::{Geometry, MeshCoordinates};
pub use limits::{limits, ColorLimits};
pub use plotter::{PanelReport, PlotOptions, RenderedWrite, SlicePlotter};
pub use reader::{
    distribute_writes, DatasetDocument, DatasetMap, MemoryReader, OutputTarget, SliceReader,
    WriteAssignment,
};
pub use sync::{BarrierSync, NoSync, SyncScope, Synchronizer, WorkerContext};
pub use transform::{transform, TransformOptions};
