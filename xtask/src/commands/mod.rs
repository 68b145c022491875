//! Task implementations.

pub mod completions;

pub mod man;

/// Binary name used for generated artifacts.
pub const BIN_NAME: &str = "bump";
