//! Common types shared across the slice plotting crates.

pub mod dataset;
pub mod error;
pub mod field;

pub use dataset::{match_basis, Dataset, TimeScales};
pub use error::{Result, SliceError};
pub use field::Field2;
