//! Command implementations

pub mod release;

pub mod version;

/// How command results are reported on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print nothing but errors.
    pub quiet: bool,
    /// Print a single JSON document instead of the human report.
    pub json: bool,
}

impl Output {
    /// Whether the human-readable report is printed.
    pub const fn human(self) -> bool {
        !self.quiet && !self.json
    }
}
