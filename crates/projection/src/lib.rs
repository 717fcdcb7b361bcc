//! Coordinate reference system transformations for plot axes.
//!
//! Implements map projections from scratch without external dependencies.
//! Every projection maps data coordinates to a flat projected plane; points
//! that cannot be shown (the far side of a globe) map to `None`.

pub mod mollweide;
pub mod orthographic;
pub mod polar;
pub mod transform;

pub use mollweide::Mollweide;
pub use orthographic::Orthographic;
pub use polar::Polar;
pub use transform::{Identity, PlateCarree, Projection};
