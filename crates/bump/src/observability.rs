//! Observability setup: structured logging.
//!
//! Two layers sit on one registry:
//! - JSON lines written to a log file through a non-blocking appender
//! - human-readable diagnostics on stderr
//!
//! **Important**: This module never writes to stdout, which carries the
//! release report. The log file is never placed in the working tree either,
//! since an untracked file there would fail the next clean-tree check.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

const ENV_LOG_PATH: &str = "BUMP_LOG_PATH";
const ENV_LOG_DIR: &str = "BUMP_LOG_DIR";
const DEFAULT_LOG_DIR_UNIX: &str = "/var/log";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Target of the final error event. `main` already prints the error, so it
/// only goes to the log file.
pub const FATAL_TARGET: &str = "bump::fatal";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// The service name used for the log file name and platform directories.
    pub service: String,
    /// Directory for JSONL log files from the config. Falls back to platform
    /// defaults if unset.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Create config for this binary with an optional configured log directory.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

/// Guard that must be held for the lifetime of the application so buffered
/// log lines are flushed on exit.
pub struct ObservabilityGuard {
    _log_guard: Option<WorkerGuard>,
}

/// Install the file and stderr layers.
///
/// When no log file can be opened, only the stderr layer is installed and a
/// warning says why.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    file_filter: EnvFilter,
    stderr_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (file_layer, log_guard, unavailable) =
        match build_log_writer(&cfg.service, cfg.log_dir.as_deref()) {
            Ok((writer, guard)) => {
                let layer = fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter);
                (Some(layer), Some(guard), None)
            }
            Err(reason) => (None, None, Some(reason)),
        };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(stderr_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    if let Some(reason) = unavailable {
        tracing::warn!(%reason, "file logging disabled");
    }
    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard {
        _log_guard: log_guard,
    })
}

/// Filter for the log file.
///
/// Priority: quiet flag > debug flag > RUST_LOG env > configured level
pub fn file_filter(quiet: bool, debug: bool, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Filter for stderr diagnostics. `RUST_LOG` does not apply here.
pub fn stderr_filter(quiet: bool, debug: bool) -> EnvFilter {
    let level = if quiet {
        "error"
    } else if debug {
        "debug"
    } else {
        "warn"
    };
    EnvFilter::new(format!("{level},{FATAL_TARGET}=off"))
}

// ============================================================================
// Log Target Resolution
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
    /// Daily rotation for directory targets; an explicit file path is used as is.
    rotate: bool,
}

impl LogTarget {
    fn in_dir(dir: PathBuf, service: &str) -> Self {
        Self {
            dir,
            file_name: format!("{service}{LOG_FILE_SUFFIX}"),
            rotate: true,
        }
    }

    fn at_path(path: &Path) -> Result<Self, String> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?
            .to_string();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name,
            rotate: false,
        })
    }

    /// Create the directory and prove it can be written to.
    ///
    /// A rotating appender writes to dated files, so only the directory is
    /// probed, with an anonymous temporary file. A fixed path is opened.
    fn check_writable(self) -> Result<Self, String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| format!("cannot create log directory {}: {e}", self.dir.display()))?;
        if self.rotate {
            tempfile::tempfile_in(&self.dir).map_err(|e| {
                format!("cannot write to log directory {}: {e}", self.dir.display())
            })?;
        } else {
            let path = self.dir.join(&self.file_name);
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| format!("cannot open log file {}: {e}", path.display()))?;
        }
        Ok(self)
    }

    #[cfg(test)]
    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Where a log file may come from, strongest first.
#[derive(Debug, Default)]
struct LogSources {
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    /// Platform locations tried when nothing is set explicitly.
    fallbacks: Vec<PathBuf>,
}

impl LogSources {
    fn from_env(service: &str, config_dir: Option<&Path>) -> Self {
        let mut fallbacks = Vec::new();
        if cfg!(unix) {
            fallbacks.push(PathBuf::from(DEFAULT_LOG_DIR_UNIX));
        }
        if let Some(dirs) = directories::ProjectDirs::from("", "", service) {
            fallbacks.push(dirs.data_local_dir().join("logs"));
        }

        Self {
            path_override: std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
            dir_override: std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
            config_dir: config_dir.map(Path::to_path_buf),
            fallbacks,
        }
    }

    /// An explicit choice must work; fallbacks are tried until one does.
    fn resolve(self, service: &str) -> Result<LogTarget, String> {
        if let Some(path) = self.path_override {
            return LogTarget::at_path(&path)?.check_writable();
        }
        if let Some(dir) = self.dir_override.or(self.config_dir) {
            return LogTarget::in_dir(dir, service).check_writable();
        }

        self.fallbacks
            .into_iter()
            .find_map(|dir| LogTarget::in_dir(dir, service).check_writable().ok())
            .ok_or_else(|| "no writable log directory found".to_string())
    }
}

fn build_log_writer(
    service: &str,
    config_log_dir: Option<&Path>,
) -> Result<(NonBlocking, WorkerGuard), String> {
    let target = LogSources::from_env(service, config_log_dir).resolve(service)?;
    let appender = if target.rotate {
        tracing_appender::rolling::daily(&target.dir, &target.file_name)
    } else {
        tracing_appender::rolling::never(&target.dir, &target.file_name)
    };
    Ok(tracing_appender::non_blocking(appender))
}

// ============================================================================
// Tests
// ============================================================================
