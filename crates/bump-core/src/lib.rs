//! Core library for bump.
//!
//! This crate provides the version model and the release workflow used by
//! the `bump` CLI and any downstream consumers.
//!
//! # Modules
//!
//! - [`bump`] - Next-version computation (patch, minor, major, pre-release)
//! - [`config`] - Configuration loading from `.bump.json`
//! - [`error`] - Configuration error types and result aliases
//! - [`git`] - Git operations behind the [`Repository`] trait
//! - [`hooks`] - Pre-hook execution behind the [`ShellRunner`] trait
//! - [`release`] - The end-to-end release sequence
//! - [`version`] - Tag parsing, rendering, precedence and latest-tag selection
//!
//! # Quick Start
//!
//! ```no_run
//! use bump_core::{BumpKind, ConfigLoader, GitRepo, ReleaseOptions, SystemShell, run_release};
//! use camino::Utf8Path;
//!
//! let repo = GitRepo::discover(Utf8Path::new(".")).expect("not a git repository");
//! let config = ConfigLoader::new()
//!     .with_project_root(repo.root())
//!     .load()
//!     .expect("Failed to load configuration");
//! let shell = SystemShell::new(repo.root());
//!
//! let outcome = run_release(
//!     &repo,
//!     &shell,
//!     &config,
//!     BumpKind::Patch,
//!     &ReleaseOptions { dry_run: true, ..ReleaseOptions::default() },
//!     |_| {},
//! )
//! .expect("release failed");
//! println!("next tag: {}", outcome.tag);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod git;

pub mod hooks;

pub mod release;

pub mod version;

pub use bump::{BumpError, BumpKind, PreReleaseTrack};

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use git::{GitError, GitRepo, Repository};

pub use hooks::{HookEnv, HookError, ShellRunner, SystemShell};

pub use release::{ReleaseError, ReleaseEvent, ReleaseOptions, ReleaseOutcome, run_release};

pub use version::{Version, VersionError, compare, select_latest};
