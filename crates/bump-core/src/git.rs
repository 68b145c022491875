//! Git operations for tagging releases.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, GPG signing, hooks, and other configuration.
//!
//! The release workflow only talks to the [`Repository`] trait, so it can be
//! driven against an in-memory fake in tests. [`GitRepo`] is the real thing.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Remote used for fetching and pushing unless told otherwise.
pub const DEFAULT_REMOTE: &str = "origin";

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "status").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// No `git` executable on `PATH`.
    #[error("git executable not found in PATH")]
    GitNotFound,

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,

    /// The current branch has no counterpart on the remote.
    #[error("remote branch for {branch} not found")]
    RemoteNotFound {
        /// Local branch name, or `HEAD` when detached.
        branch: String,
    },

    /// Fetching from the remote failed.
    #[error("fetch failed")]
    Fetch(#[source] Box<GitError>),

    /// Creating the tag failed, typically because it already exists.
    #[error("failed to create tag {tag}")]
    Tag {
        /// The tag name.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<GitError>,
    },

    /// Pushing the tag failed.
    #[error("failed to push tag {tag}")]
    Push {
        /// The tag name.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<GitError>,
    },

    /// Staging, committing or pushing pending changes failed.
    #[error("failed to commit and push changes")]
    Commit(#[source] Box<GitError>),
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// What the release workflow needs from a repository.
pub trait Repository {
    /// Every tag name in the repository, in no particular order.
    fn list_tags(&self) -> GitResult<Vec<String>>;

    /// Whether the working tree has staged, unstaged, or untracked changes.
    fn has_uncommitted_changes(&self) -> GitResult<bool>;

    /// Update remote-tracking refs and tags.
    fn fetch(&self) -> GitResult<()>;

    /// Whether `HEAD` matches the remote-tracking ref of the current branch.
    ///
    /// Fails with [`GitError::RemoteNotFound`] when no such ref exists.
    fn is_synced_with_remote(&self) -> GitResult<bool>;

    /// Create a lightweight tag at `HEAD`. Fails if the tag exists.
    fn create_tag(&self, name: &str) -> GitResult<()>;

    /// Push a single tag to the remote.
    fn push_tag(&self, name: &str) -> GitResult<()>;

    /// Stage everything, commit with `message`, and push the current branch.
    fn commit_and_push(&self, message: &str) -> GitResult<()>;
}

/// A repository on disk, driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: Utf8PathBuf,
    remote: String,
}

impl GitRepo {
    /// Locate the repository containing `dir`.
    ///
    /// # Errors
    ///
    /// [`GitError::GitNotFound`] without a `git` binary, [`GitError::NotARepo`]
    /// outside a work tree.
    #[instrument]
    pub fn discover(dir: &Utf8Path) -> GitResult<Self> {
        which::which("git").map_err(|_| GitError::GitNotFound)?;
        let root = Utf8PathBuf::from(git_in(dir, &["rev-parse", "--show-toplevel"])?.trim());
        debug!(%root, "found repository root");
        Ok(Self {
            root,
            remote: DEFAULT_REMOTE.to_string(),
        })
    }

    /// The top-level directory of the work tree.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The remote used for fetch and push.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Current branch name, `None` when `HEAD` is detached.
    #[instrument(skip(self))]
    pub fn current_branch(&self) -> GitResult<Option<String>> {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string();
        if branch == "HEAD" {
            debug!("detached HEAD");
            Ok(None)
        } else {
            debug!(%branch, "current branch");
            Ok(Some(branch))
        }
    }

    fn git(&self, args: &[&str]) -> GitResult<String> {
        git_in(&self.root, args)
    }
}

impl Repository for GitRepo {
    #[instrument(skip(self))]
    fn list_tags(&self) -> GitResult<Vec<String>> {
        let output = self.git(&["tag", "--list"])?;
        let tags: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = tags.len(), "listed tags");
        Ok(tags)
    }

    #[instrument(skip(self))]
    fn has_uncommitted_changes(&self) -> GitResult<bool> {
        let output = self.git(&["status", "--porcelain"])?;
        let dirty = !output.trim().is_empty();
        debug!(dirty, "working tree status");
        Ok(dirty)
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn fetch(&self) -> GitResult<()> {
        self.git(&["fetch", "--tags", &self.remote])
            .map_err(|e| GitError::Fetch(Box::new(e)))?;
        Ok(())
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn is_synced_with_remote(&self) -> GitResult<bool> {
        let Some(branch) = self.current_branch()? else {
            return Err(GitError::RemoteNotFound {
                branch: "HEAD".to_string(),
            });
        };

        let remote_ref = format!("refs/remotes/{}/{branch}", self.remote);
        let remote = match self.git(&["rev-parse", "--verify", "--quiet", &remote_ref]) {
            Ok(oid) => oid.trim().to_string(),
            Err(GitError::Command { .. }) => return Err(GitError::RemoteNotFound { branch }),
            Err(e) => return Err(e),
        };
        let local = self.git(&["rev-parse", "HEAD"])?.trim().to_string();

        let in_sync = local == remote;
        debug!(%local, %remote, in_sync, "remote sync check");
        Ok(in_sync)
    }

    #[instrument(skip(self))]
    fn create_tag(&self, name: &str) -> GitResult<()> {
        self.git(&["tag", name]).map_err(|e| GitError::Tag {
            tag: name.to_string(),
            source: Box::new(e),
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn push_tag(&self, name: &str) -> GitResult<()> {
        let refspec = format!("refs/tags/{name}:refs/tags/{name}");
        self.git(&["push", &self.remote, &refspec])
            .map_err(|e| GitError::Push {
                tag: name.to_string(),
                source: Box::new(e),
            })?;
        Ok(())
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn commit_and_push(&self, message: &str) -> GitResult<()> {
        let commit = || -> GitResult<()> {
            self.git(&["add", "--all"])?;
            self.git(&["commit", "--message", message])?;
            self.git(&["push", &self.remote, "HEAD"])?;
            Ok(())
        };
        commit().map_err(|e| GitError::Commit(Box::new(e)))
    }
}

/// Run a git command in `dir` and return its stdout.
fn git_in(dir: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir.as_std_path())
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // Detect "not a git repo" specifically
        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}
