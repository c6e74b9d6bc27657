//! Command implementations for the `cohort` binary.
//!
//! Each command loads its inputs, computes, and renders to a caller-supplied
//! writer so it can be exercised without a terminal.

pub mod commands;
pub mod render;
pub mod run;
pub mod settings;

pub use settings::{Format, Settings};
