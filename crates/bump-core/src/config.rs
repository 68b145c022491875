//! Configuration loading.
//!
//! Settings come from, in increasing order of precedence:
//! 1. Built-in defaults
//! 2. `.bump.json` at the repository root
//! 3. Files passed explicitly (e.g. `bump --config other.json`)
//!
//! Keys use camelCase to match the `.bump.json` files already found in the
//! wild:
//!
//! ```json
//! {
//!   "prefix": "v",
//!   "message": "chore: release ${VERSION}",
//!   "preHook": ["./scripts/update-version.sh"]
//! }
//! ```
//!
//! # Example
//! ```no_run
//! use bump_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_project_root("/path/to/repo")
//!     .load()
//!     .unwrap();
//! assert!(config.verify);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Name of the project configuration file, looked up at the repository root.
pub const CONFIG_FILE: &str = ".bump.json";

/// Shell used for pre-hook commands when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/bash -c";

/// Commit message template used when none is configured.
pub const DEFAULT_MESSAGE: &str = "release ${VERSION}";

/// The configuration for bump.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Log level for the JSONL log file.
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Commit and push changes left behind by the pre-hook.
    pub commit: bool,
    /// Commit message template. `${VERSION}` and `${PREVIOUS_VERSION}` are
    /// replaced with the new and previous tags.
    pub message: String,
    /// Prefix for new tags, overriding the one inherited from the latest tag.
    pub prefix: Option<String>,
    /// Fetch from the remote before checking that the branch is in sync.
    pub fetch: bool,
    /// Refuse to tag a dirty or unsynced working tree.
    pub verify: bool,
    /// Shell and leading arguments used to run each pre-hook command.
    pub shell: String,
    /// Commands run before committing and tagging.
    pub pre_hook: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            commit: true,
            message: DEFAULT_MESSAGE.to_string(),
            prefix: None,
            fetch: true,
            verify: true,
            shell: DEFAULT_SHELL.to_string(),
            pre_hook: Vec::new(),
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Repository root holding the optional `.bump.json`.
    project_root: Option<Utf8PathBuf>,
    /// Explicit config files to load, in order.
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that yields the defaults until sources are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `.bump.json` from this directory if it exists.
    pub fn with_project_root<P: AsRef<Utf8Path>>(mut self, root: P) -> Self {
        self.project_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence over
    /// earlier ones and over the project file. Unlike the project file, an
    /// explicit file must exist.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Path of the project config file, if one exists under the root.
    pub fn project_file(&self) -> Option<Utf8PathBuf> {
        self.project_root
            .as_ref()
            .map(|root| root.join(CONFIG_FILE))
            .filter(|path| path.is_file())
    }

    /// Load configuration, merging all sources.
    ///
    /// # Errors
    ///
    /// Fails when an explicit file is missing or when any file holds invalid
    /// JSON or values of the wrong type. Unknown keys are ignored.
    #[tracing::instrument(skip(self), fields(project_root = ?self.project_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(project_file) = self.project_file() {
            tracing::debug!(file = %project_file, "found project config");
            figment = figment.merge(Json::file_exact(project_file.as_str()));
        }

        for file in &self.explicit_files {
            if !file.is_file() {
                return Err(ConfigError::Missing(file.clone()));
            }
            figment = figment.merge(Json::file_exact(file.as_str()));
        }

        let mut config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        if config.shell.trim().is_empty() {
            config.shell = DEFAULT_SHELL.to_string();
        }

        tracing::info!(
            log_level = config.log_level.as_str(),
            pre_hook = config.pre_hook.len(),
            "configuration loaded"
        );
        Ok(config)
    }
}
