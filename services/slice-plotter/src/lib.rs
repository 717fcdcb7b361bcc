//! Slice plotter service library.
//!
//! Exposes configuration resolution and the worker pool for testing.

pub mod run;
pub mod worker;

pub use run::{check_tasks, resolve_config, run_workers, Overrides};
