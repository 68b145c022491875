//! Library interface for the `bump` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//!
//! # Documentation Generation
//!
//! The [`command()`] function returns the clap `Command` for generating man pages
//! and shell completions via `xtask`.

pub mod commands;

use bump_core::bump::BumpKind;
use bump_core::release::{self, ReleaseOptions, ReleaseResult};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
CONFIGURATION:
    .bump.json at the repository root, e.g.
    {\"prefix\": \"v\", \"message\": \"release ${VERSION}\", \"preHook\": [\"make version\"]}

ENVIRONMENT VARIABLES:
    RUST_LOG           Log file filter (e.g., debug, bump_core=trace)
    BUMP_LOG_PATH      Explicit log file path
    BUMP_LOG_DIR       Log directory
";

/// Command-line interface definition for bump.
#[derive(Parser, Debug)]
#[command(name = "bump")]
#[command(about = "Tag the next semantic version of a git repository", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The bump to perform (defaults to patch).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show what would happen without running hooks, committing or tagging
    #[arg(short = 'x', long, global = true)]
    pub dry_run: bool,

    /// Skip the clean working tree and remote sync checks
    #[arg(short = 'n', long, global = true)]
    pub no_verify: bool,

    /// Do not fetch from the remote before checking sync
    #[arg(short = 'f', long, global = true)]
    pub no_fetch: bool,

    /// Do not commit changes left by the pre-hook
    #[arg(long, global = true)]
    pub no_commit: bool,

    /// Do not run the pre-hook
    #[arg(long, global = true)]
    pub skip_pre_hook: bool,

    /// Tag prefix (overrides config and the latest tag's prefix)
    #[arg(short, long, global = true, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Build metadata for the new tag
    #[arg(short, long, global = true, value_name = "BUILD")]
    pub build: Option<String>,

    /// Start an alpha pre-release (-alpha.1)
    #[arg(long, global = true)]
    pub alpha: bool,

    /// Start a beta pre-release (-beta.1)
    #[arg(long, global = true)]
    pub beta: bool,

    /// Start a release candidate (-rc.1)
    #[arg(long, global = true)]
    pub rc: bool,

    /// Path to an extra configuration file (layered over .bump.json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (wins over --debug)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    /// Collect the release switches into options for the orchestrator.
    ///
    /// # Errors
    ///
    /// Fails when more than one of `--alpha`, `--beta` and `--rc` is given.
    pub fn release_options(&self) -> ReleaseResult<ReleaseOptions> {
        Ok(ReleaseOptions {
            dry_run: self.dry_run,
            no_verify: self.no_verify,
            no_fetch: self.no_fetch,
            no_commit: self.no_commit,
            skip_pre_hook: self.skip_pre_hook,
            prefix: self.prefix.clone(),
            build: self.build.clone(),
            track: release::pre_release_track(self.alpha, self.beta, self.rc)?,
        })
    }
}

/// Available subcommands for the CLI.
#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Commands {
    /// Bump the patch version: 1.2.3 -> 1.2.4 (default)
    #[default]
    #[command(visible_alias = "pa")]
    Patch,

    /// Bump the minor version: 1.2.3 -> 1.3.0
    #[command(visible_alias = "mi")]
    Minor,

    /// Bump the major version: 1.2.3 -> 2.0.0
    #[command(visible_alias = "ma")]
    Major,

    /// Bump the pre-release counter: 1.2.3-rc.1 -> 1.2.3-rc.2
    #[command(visible_alias = "pre")]
    Prerelease,

    /// Print the version of bump
    Version,
}

impl Commands {
    /// The bump this subcommand performs, `None` for `version`.
    pub const fn bump_kind(self) -> Option<BumpKind> {
        match self {
            Self::Patch => Some(BumpKind::Patch),
            Self::Minor => Some(BumpKind::Minor),
            Self::Major => Some(BumpKind::Major),
            Self::Prerelease => Some(BumpKind::PreRelease),
            Self::Version => None,
        }
    }
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
