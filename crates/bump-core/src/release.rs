//! Release orchestrator: from the latest tag to a pushed new tag.
//!
//! # Sequence
//!
//! 1. Verify the working tree is clean and in sync with the remote
//!    (fetching first), unless verification is off
//! 2. Select the latest version among all tags
//! 3. Compute the next version, then apply prefix, build and track overrides
//! 4. Run the pre-hook with `VERSION` and `PREVIOUS_VERSION` exported
//! 5. Commit and push whatever the pre-hook left behind
//! 6. Create and push the tag
//!
//! In dry-run mode steps 4 to 6 are reported through [`ReleaseEvent`]s but
//! nothing is executed. The orchestrator only talks to the [`Repository`]
//! and [`ShellRunner`] traits, so every step can be observed with fakes.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::bump::{self, BumpError, BumpKind, PreReleaseTrack};
use crate::config::Config;
use crate::git::{GitError, Repository};
use crate::hooks::{HookEnv, HookError, HookOutput, ShellRunner};
use crate::version::{self, Version, VersionError};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from the release workflow.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The working tree has changes that are not committed.
    #[error("uncommitted changes")]
    UncommittedChanges,

    /// The current branch differs from its remote counterpart.
    #[error("unpushed changes")]
    UnpushedChanges,

    /// More than one of alpha, beta and rc was requested.
    #[error("only one of --alpha, --beta, --rc can be specified")]
    ConflictingPreReleaseFlags,

    /// The overrides produced a tag that does not parse back.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Version bump error.
    #[error(transparent)]
    Bump(#[from] BumpError),

    /// Git error.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A pre-hook command failed.
    #[error("pre-hook failed")]
    Hook(#[from] HookError),
}

/// Result alias for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

// ──────────────────────────────────────────────
// Options, events, outcome
// ──────────────────────────────────────────────

/// Per-invocation switches, usually straight from the command line.
///
/// The `no_*` switches can only turn off what the config turns on.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Report what would happen without running hooks, committing or tagging.
    pub dry_run: bool,
    /// Skip the clean-tree and remote-sync checks.
    pub no_verify: bool,
    /// Skip fetching before the remote-sync check.
    pub no_fetch: bool,
    /// Never commit, even when the pre-hook leaves changes.
    pub no_commit: bool,
    /// Do not run the pre-hook.
    pub skip_pre_hook: bool,
    /// Prefix for the new tag; wins over the config and the latest tag.
    pub prefix: Option<String>,
    /// Build metadata for the new tag. Without it the new tag has none.
    pub build: Option<String>,
    /// Start a pre-release track on the bumped version.
    pub track: Option<PreReleaseTrack>,
}

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone)]
pub enum ReleaseEvent {
    /// Repository checks are about to run.
    Verifying {
        /// Whether the remote is fetched first.
        fetch: bool,
    },
    /// The previous and next versions are known.
    VersionResolved {
        /// Latest existing version, `0.0.0` if there is none.
        previous: Version,
        /// The version that will be tagged.
        next: Version,
        /// Number of tags inspected.
        tags: usize,
    },
    /// Pre-hook commands are about to run (or would run in dry-run mode).
    HooksStarted {
        /// The commands as configured.
        commands: Vec<String>,
        /// Whether these hooks will actually be executed (false in dry-run mode).
        will_execute: bool,
    },
    /// Pre-hook commands were configured but skipped on request.
    HooksSkipped {
        /// Number of configured commands.
        count: usize,
    },
    /// Pre-hook commands finished successfully.
    HooksCompleted {
        /// Per-command results.
        outputs: Vec<HookOutput>,
    },
    /// Pending changes are being committed (or would be in dry-run mode).
    Committing {
        /// The rendered commit message.
        message: String,
        /// Whether the commit will actually be made.
        will_execute: bool,
    },
    /// The tag is being created and pushed (or would be in dry-run mode).
    Tagging {
        /// The new tag.
        tag: String,
        /// Whether the tag will actually be created.
        will_execute: bool,
    },
}

/// What a release did.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    /// The bump that was applied.
    pub kind: BumpKind,
    /// The latest version before this release.
    pub previous: Version,
    /// The released version.
    pub next: Version,
    /// The tag name, identical to `next` rendered.
    pub tag: String,
    /// Commit message, if pending changes were (or would be) committed.
    pub commit_message: Option<String>,
    /// Number of pre-hook commands that ran.
    pub hooks_run: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

// ──────────────────────────────────────────────
// Workflow
// ──────────────────────────────────────────────

/// Turn the three pre-release switches into at most one track.
///
/// # Errors
///
/// [`ReleaseError::ConflictingPreReleaseFlags`] when more than one is set.
pub fn pre_release_track(
    alpha: bool,
    beta: bool,
    rc: bool,
) -> ReleaseResult<Option<PreReleaseTrack>> {
    match (alpha, beta, rc) {
        (false, false, false) => Ok(None),
        (true, false, false) => Ok(Some(PreReleaseTrack::Alpha)),
        (false, true, false) => Ok(Some(PreReleaseTrack::Beta)),
        (false, false, true) => Ok(Some(PreReleaseTrack::Rc)),
        _ => Err(ReleaseError::ConflictingPreReleaseFlags),
    }
}

/// Fail unless the working tree is clean and matches the remote.
///
/// # Errors
///
/// [`ReleaseError::UncommittedChanges`], [`ReleaseError::UnpushedChanges`],
/// or whatever the repository reports.
#[instrument(skip(repo))]
pub fn check_repository_status(repo: &impl Repository, fetch: bool) -> ReleaseResult<()> {
    if repo.has_uncommitted_changes()? {
        return Err(ReleaseError::UncommittedChanges);
    }
    if fetch {
        debug!("fetching remote");
        repo.fetch()?;
    }
    if !repo.is_synced_with_remote()? {
        return Err(ReleaseError::UnpushedChanges);
    }
    Ok(())
}

/// Replace `${VERSION}` and `${PREVIOUS_VERSION}` in a message template.
///
/// Other `${...}` sequences are left as they are.
pub fn render_message(template: &str, env: &HookEnv) -> String {
    env.vars()
        .iter()
        .fold(template.to_string(), |message, (name, value)| {
            message.replace(&format!("${{{name}}}"), value)
        })
}

/// Run the whole release.
///
/// `on_event` is called as each step starts or finishes, which is how the
/// CLI prints progress.
///
/// # Errors
///
/// Stops at the first failing step. Collaborator errors are forwarded
/// unchanged inside [`ReleaseError`].
#[instrument(skip_all, fields(%kind, dry_run = options.dry_run))]
pub fn run_release(
    repo: &impl Repository,
    shell: &impl ShellRunner,
    config: &Config,
    kind: BumpKind,
    options: &ReleaseOptions,
    mut on_event: impl FnMut(ReleaseEvent),
) -> ReleaseResult<ReleaseOutcome> {
    let verify = config.verify && !options.no_verify;
    let fetch = config.fetch && !options.no_fetch;
    let commit = config.commit && !options.no_commit;
    debug!(verify, fetch, commit, "effective settings");

    if verify {
        on_event(ReleaseEvent::Verifying { fetch });
        check_repository_status(repo, fetch)?;
    }

    let tags = repo.list_tags()?;
    let previous = version::select_latest(&tags);
    let next = next_version(&previous, kind, config, options)?;
    let tag = next.to_string();
    debug!(%previous, %next, "resolved next version");
    on_event(ReleaseEvent::VersionResolved {
        previous: previous.clone(),
        next: next.clone(),
        tags: tags.len(),
    });

    let env = HookEnv {
        version: tag.clone(),
        previous_version: previous.to_string(),
    };

    let mut hooks_run = 0;
    if !config.pre_hook.is_empty() {
        if options.skip_pre_hook {
            on_event(ReleaseEvent::HooksSkipped {
                count: config.pre_hook.len(),
            });
        } else {
            on_event(ReleaseEvent::HooksStarted {
                commands: config.pre_hook.clone(),
                will_execute: !options.dry_run,
            });
            if !options.dry_run {
                let outputs = shell.run(&config.shell, &config.pre_hook, &env)?;
                hooks_run = outputs.len();
                on_event(ReleaseEvent::HooksCompleted { outputs });
            }
        }
    }

    let mut commit_message = None;
    if commit && repo.has_uncommitted_changes()? {
        let message = render_message(&config.message, &env);
        on_event(ReleaseEvent::Committing {
            message: message.clone(),
            will_execute: !options.dry_run,
        });
        if !options.dry_run {
            repo.commit_and_push(&message)?;
        }
        commit_message = Some(message);
    }

    on_event(ReleaseEvent::Tagging {
        tag: tag.clone(),
        will_execute: !options.dry_run,
    });
    if !options.dry_run {
        repo.create_tag(&tag)?;
        repo.push_tag(&tag)?;
    }

    info!(%previous, %tag, hooks_run, "release complete");
    Ok(ReleaseOutcome {
        kind,
        previous,
        next,
        tag,
        commit_message,
        hooks_run,
        dry_run: options.dry_run,
    })
}

/// Bump `previous`, then layer on prefix, build and track.
fn next_version(
    previous: &Version,
    kind: BumpKind,
    config: &Config,
    options: &ReleaseOptions,
) -> ReleaseResult<Version> {
    let mut next = kind.apply(previous)?;

    // flag, then config, otherwise inherited from the previous tag
    let prefix =
        non_empty(options.prefix.as_deref()).or_else(|| non_empty(config.prefix.as_deref()));
    if let Some(prefix) = prefix {
        next.prefix = Some(prefix.to_string());
    }

    // build metadata is never carried over
    next.build = non_empty(options.build.as_deref()).map(str::to_string);

    if let Some(track) = options.track {
        next = bump::to_track(&next, track);
    }

    // the tag must read back as the same version, or the next run loses it
    let rendered = next.to_string();
    if Version::parse(&rendered)? != next {
        return Err(VersionError::InvalidFormat {
            input: rendered,
            reason: "prefix must not contain digits",
        }
        .into());
    }
    Ok(next)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    // ──────────────────────────────────────────
    // Fakes
    // ──────────────────────────────────────────

    struct FakeRepo {
        tags: Vec<String>,
        dirty: Rc<Cell<bool>>,
        synced: bool,
        remote_branch: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRepo {
        fn with_tags(tags: &[&str]) -> Self {
            Self {
                tags: tags.iter().map(ToString::to_string).collect(),
                dirty: Rc::new(Cell::new(false)),
                synced: true,
                remote_branch: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn wrote_anything(&self) -> bool {
            self.calls()
                .iter()
                .any(|c| c.starts_with("tag") || c.starts_with("push") || c.starts_with("commit"))
        }
    }

    impl Repository for FakeRepo {
        fn list_tags(&self) -> crate::git::GitResult<Vec<String>> {
            self.record("list_tags");
            Ok(self.tags.clone())
        }

        fn has_uncommitted_changes(&self) -> crate::git::GitResult<bool> {
            self.record("status");
            Ok(self.dirty.get())
        }

        fn fetch(&self) -> crate::git::GitResult<()> {
            self.record("fetch");
            Ok(())
        }

        fn is_synced_with_remote(&self) -> crate::git::GitResult<bool> {
            self.record("sync");
            if !self.remote_branch {
                return Err(GitError::RemoteNotFound {
                    branch: "main".into(),
                });
            }
            Ok(self.synced)
        }

        fn create_tag(&self, name: &str) -> crate::git::GitResult<()> {
            self.record(format!("tag {name}"));
            Ok(())
        }

        fn push_tag(&self, name: &str) -> crate::git::GitResult<()> {
            self.record(format!("push {name}"));
            Ok(())
        }

        fn commit_and_push(&self, message: &str) -> crate::git::GitResult<()> {
            self.record(format!("commit {message}"));
            self.dirty.set(false);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeShell {
        leaves_changes: Option<Rc<Cell<bool>>>,
        fail: bool,
        runs: RefCell<Vec<(String, Vec<String>, HookEnv)>>,
    }

    impl FakeShell {
        fn dirtying(repo: &FakeRepo) -> Self {
            Self {
                leaves_changes: Some(Rc::clone(&repo.dirty)),
                ..Self::default()
            }
        }
    }

    impl ShellRunner for FakeShell {
        fn run(
            &self,
            shell: &str,
            commands: &[String],
            env: &HookEnv,
        ) -> crate::hooks::HookResult<Vec<HookOutput>> {
            self.runs
                .borrow_mut()
                .push((shell.to_string(), commands.to_vec(), env.clone()));
            if self.fail {
                return Err(HookError::CommandFailed {
                    command: commands[0].clone(),
                    exit_code: Some(1),
                    stderr: String::new(),
                });
            }
            if let Some(dirty) = &self.leaves_changes {
                dirty.set(true);
            }
            Ok(commands
                .iter()
                .map(|command| HookOutput {
                    command: command.clone(),
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::ZERO,
                })
                .collect())
        }
    }

    fn release(
        repo: &FakeRepo,
        shell: &FakeShell,
        config: &Config,
        kind: BumpKind,
        options: &ReleaseOptions,
    ) -> (ReleaseResult<ReleaseOutcome>, Vec<ReleaseEvent>) {
        let mut events = Vec::new();
        let result = run_release(repo, shell, config, kind, options, |e| events.push(e));
        (result, events)
    }

    fn hooked_config() -> Config {
        Config {
            pre_hook: vec!["make version".into()],
            ..Config::default()
        }
    }

    // ──────────────────────────────────────────
    // Tests
    // ──────────────────────────────────────────

    #[test]
    fn patch_release_runs_the_full_sequence() {
        let repo = FakeRepo::with_tags(&["v1.2.3", "junk", "v1.0.0"]);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );

        let outcome = result.unwrap();
        assert_eq!(outcome.previous.to_string(), "v1.2.3");
        assert_eq!(outcome.tag, "v1.2.4");
        assert!(outcome.commit_message.is_none());
        assert_eq!(
            repo.calls(),
            ["status", "fetch", "sync", "list_tags", "status", "tag v1.2.4", "push v1.2.4"]
        );
    }

    #[test]
    fn empty_repository_starts_from_zero() {
        let repo = FakeRepo::with_tags(&[]);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Minor,
            &ReleaseOptions::default(),
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.previous, Version::zero());
        assert_eq!(outcome.tag, "0.1.0");
    }

    #[test]
    fn dirty_tree_fails_before_reading_tags() {
        let repo = FakeRepo::with_tags(&["1.0.0"]);
        repo.dirty.set(true);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        assert!(matches!(result, Err(ReleaseError::UncommittedChanges)));
        assert_eq!(repo.calls(), ["status"]);
    }

    #[test]
    fn unsynced_branch_fails() {
        let mut repo = FakeRepo::with_tags(&["1.0.0"]);
        repo.synced = false;
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        assert!(matches!(result, Err(ReleaseError::UnpushedChanges)));
        assert!(!repo.wrote_anything());
    }

    #[test]
    fn missing_remote_branch_propagates() {
        let mut repo = FakeRepo::with_tags(&["1.0.0"]);
        repo.remote_branch = false;
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        assert!(matches!(
            result,
            Err(ReleaseError::Git(GitError::RemoteNotFound { .. }))
        ));
    }

    #[test]
    fn fetch_can_be_disabled_by_flag_or_config() {
        let repo = FakeRepo::with_tags(&["1.0.0"]);
        let options = ReleaseOptions {
            no_fetch: true,
            ..ReleaseOptions::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &options,
        );
        result.unwrap();
        assert!(!repo.calls().contains(&"fetch".to_string()));

        let repo = FakeRepo::with_tags(&["1.0.0"]);
        let config = Config {
            fetch: false,
            ..Config::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &config,
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        result.unwrap();
        assert_eq!(repo.calls()[..2], ["status", "sync"]);
    }

    #[test]
    fn no_verify_skips_all_checks() {
        let mut repo = FakeRepo::with_tags(&["1.0.0"]);
        repo.synced = false;
        let options = ReleaseOptions {
            no_verify: true,
            ..ReleaseOptions::default()
        };
        let (result, events) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &options,
        );
        result.unwrap();
        assert_eq!(repo.calls()[0], "list_tags");
        assert!(!events.iter().any(|e| matches!(e, ReleaseEvent::Verifying { .. })));
    }

    #[test]
    fn dry_run_reports_but_changes_nothing() {
        let repo = FakeRepo::with_tags(&["v0.9.0"]);
        let shell = FakeShell::dirtying(&repo);
        let options = ReleaseOptions {
            dry_run: true,
            ..ReleaseOptions::default()
        };
        let (result, events) = release(&repo, &shell, &hooked_config(), BumpKind::Major, &options);

        let outcome = result.unwrap();
        assert!(outcome.dry_run);
        assert_eq!(outcome.tag, "v1.0.0");
        assert_eq!(outcome.hooks_run, 0);
        assert!(shell.runs.borrow().is_empty());
        assert!(!repo.wrote_anything());
        assert!(events.iter().any(|e| matches!(
            e,
            ReleaseEvent::HooksStarted { will_execute: false, .. }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            ReleaseEvent::Tagging { tag, will_execute: false } if tag == "v1.0.0"
        )));
    }

    #[test]
    fn prefix_flag_beats_config_which_beats_inherited() {
        let run = |cli: Option<&str>, config: Option<&str>| {
            let repo = FakeRepo::with_tags(&["v1.0.0"]);
            let config = Config {
                prefix: config.map(str::to_string),
                ..Config::default()
            };
            let options = ReleaseOptions {
                prefix: cli.map(str::to_string),
                ..ReleaseOptions::default()
            };
            let (result, _) = release(
                &repo,
                &FakeShell::default(),
                &config,
                BumpKind::Patch,
                &options,
            );
            result.unwrap().tag
        };

        assert_eq!(run(None, None), "v1.0.1");
        assert_eq!(run(None, Some("release-")), "release-1.0.1");
        assert_eq!(run(Some("api-"), Some("release-")), "api-1.0.1");
        assert_eq!(run(Some(""), None), "v1.0.1");
    }

    #[test]
    fn build_metadata_is_only_set_by_the_flag() {
        let repo = FakeRepo::with_tags(&["1.0.0+old"]);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        assert_eq!(result.unwrap().tag, "1.0.1");

        let repo = FakeRepo::with_tags(&["1.0.0+old"]);
        let options = ReleaseOptions {
            build: Some("ci.42".into()),
            ..ReleaseOptions::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &options,
        );
        assert_eq!(result.unwrap().tag, "1.0.1+ci.42");
    }

    #[test]
    fn invalid_build_is_rejected_before_any_write() {
        let repo = FakeRepo::with_tags(&["1.0.0"]);
        let options = ReleaseOptions {
            build: Some("not valid".into()),
            ..ReleaseOptions::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &options,
        );
        assert!(matches!(result, Err(ReleaseError::Version(_))));
        assert!(!repo.wrote_anything());
    }

    #[test]
    fn prefix_with_digits_is_rejected() {
        let repo = FakeRepo::with_tags(&["1.0.0"]);
        let options = ReleaseOptions {
            prefix: Some("v2-".into()),
            ..ReleaseOptions::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Patch,
            &options,
        );
        assert!(matches!(result, Err(ReleaseError::Version(_))));
        assert!(!repo.wrote_anything());
    }

    #[test]
    fn track_is_applied_after_the_bump() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let options = ReleaseOptions {
            track: Some(PreReleaseTrack::Rc),
            ..ReleaseOptions::default()
        };
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::Minor,
            &options,
        );
        assert_eq!(result.unwrap().tag, "v1.3.0-rc.1");
    }

    #[test]
    fn pre_release_bump_on_release_fails_without_writing() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::PreRelease,
            &ReleaseOptions::default(),
        );
        assert!(matches!(
            result,
            Err(ReleaseError::Bump(BumpError::NoPreRelease { .. }))
        ));
        assert!(!repo.wrote_anything());
    }

    #[test]
    fn pre_release_bump_advances_latest_pre_release() {
        let repo = FakeRepo::with_tags(&["v1.2.3-beta.1", "v1.2.2"]);
        let (result, _) = release(
            &repo,
            &FakeShell::default(),
            &Config::default(),
            BumpKind::PreRelease,
            &ReleaseOptions::default(),
        );
        assert_eq!(result.unwrap().tag, "v1.2.3-beta.2");
    }

    #[test]
    fn hook_changes_are_committed_before_tagging() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let shell = FakeShell::dirtying(&repo);
        let config = Config {
            shell: "sh -c".into(),
            ..hooked_config()
        };
        let (result, events) = release(
            &repo,
            &shell,
            &config,
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );

        let outcome = result.unwrap();
        assert_eq!(outcome.hooks_run, 1);
        assert_eq!(outcome.commit_message.as_deref(), Some("release v1.2.4"));

        let runs = shell.runs.borrow();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "sh -c");
        assert_eq!(runs[0].1, ["make version"]);
        assert_eq!(
            runs[0].2,
            HookEnv {
                version: "v1.2.4".into(),
                previous_version: "v1.2.3".into(),
            }
        );

        let calls = repo.calls();
        assert_eq!(
            calls[calls.len() - 3..],
            ["commit release v1.2.4", "tag v1.2.4", "push v1.2.4"]
        );
        assert!(events.iter().any(
            |e| matches!(e, ReleaseEvent::HooksCompleted { outputs } if outputs.len() == 1)
        ));
    }

    #[test]
    fn hook_failure_aborts_before_commit_and_tag() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let shell = FakeShell {
            fail: true,
            ..FakeShell::default()
        };
        let (result, _) = release(
            &repo,
            &shell,
            &hooked_config(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        assert!(matches!(result, Err(ReleaseError::Hook(HookError::CommandFailed { .. }))));
        assert!(!repo.wrote_anything());
    }

    #[test]
    fn skipped_hooks_are_reported() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let shell = FakeShell::default();
        let options = ReleaseOptions {
            skip_pre_hook: true,
            ..ReleaseOptions::default()
        };
        let (result, events) = release(&repo, &shell, &hooked_config(), BumpKind::Patch, &options);
        result.unwrap();
        assert!(shell.runs.borrow().is_empty());
        assert!(events.iter().any(|e| matches!(e, ReleaseEvent::HooksSkipped { count: 1 })));
    }

    #[test]
    fn commit_can_be_disabled_by_flag_or_config() {
        for (config_commit, no_commit) in [(true, true), (false, false)] {
            let repo = FakeRepo::with_tags(&["v1.2.3"]);
            let shell = FakeShell::dirtying(&repo);
            let config = Config {
                commit: config_commit,
                ..hooked_config()
            };
            let options = ReleaseOptions {
                no_commit,
                ..ReleaseOptions::default()
            };
            let (result, _) = release(&repo, &shell, &config, BumpKind::Patch, &options);
            assert!(result.unwrap().commit_message.is_none());
            assert!(!repo.calls().iter().any(|c| c.starts_with("commit")));
        }
    }

    #[test]
    fn pending_changes_are_committed_when_verification_is_off() {
        let repo = FakeRepo::with_tags(&["1.0.0"]);
        repo.dirty.set(true);
        let config = Config {
            message: "chore: ${PREVIOUS_VERSION} to ${VERSION}".into(),
            ..Config::default()
        };
        let options = ReleaseOptions {
            no_verify: true,
            ..ReleaseOptions::default()
        };
        let (result, _) = release(&repo, &FakeShell::default(), &config, BumpKind::Patch, &options);
        assert_eq!(
            result.unwrap().commit_message.as_deref(),
            Some("chore: 1.0.0 to 1.0.1")
        );
        assert!(repo.calls().contains(&"commit chore: 1.0.0 to 1.0.1".to_string()));
    }

    #[test]
    fn events_arrive_in_workflow_order() {
        let repo = FakeRepo::with_tags(&["v1.2.3"]);
        let shell = FakeShell::dirtying(&repo);
        let (result, events) = release(
            &repo,
            &shell,
            &hooked_config(),
            BumpKind::Patch,
            &ReleaseOptions::default(),
        );
        result.unwrap();

        let names: Vec<&str> = events
            .iter()
            .map(|e| match e {
                ReleaseEvent::Verifying { .. } => "verifying",
                ReleaseEvent::VersionResolved { .. } => "resolved",
                ReleaseEvent::HooksStarted { .. } => "hooks-started",
                ReleaseEvent::HooksSkipped { .. } => "hooks-skipped",
                ReleaseEvent::HooksCompleted { .. } => "hooks-completed",
                ReleaseEvent::Committing { .. } => "committing",
                ReleaseEvent::Tagging { .. } => "tagging",
            })
            .collect();
        assert_eq!(
            names,
            ["verifying", "resolved", "hooks-started", "hooks-completed", "committing", "tagging"]
        );
    }

    #[test]
    fn track_flags_are_mutually_exclusive() {
        assert_eq!(pre_release_track(false, false, false).unwrap(), None);
        assert_eq!(pre_release_track(true, false, false).unwrap(), Some(PreReleaseTrack::Alpha));
        assert_eq!(pre_release_track(false, true, false).unwrap(), Some(PreReleaseTrack::Beta));
        assert_eq!(pre_release_track(false, false, true).unwrap(), Some(PreReleaseTrack::Rc));
        assert!(matches!(
            pre_release_track(true, false, true),
            Err(ReleaseError::ConflictingPreReleaseFlags)
        ));
        assert!(pre_release_track(true, true, true).is_err());
    }

    #[test]
    fn message_placeholders_are_replaced() {
        let env = HookEnv {
            version: "v2.0.0".into(),
            previous_version: "v1.9.9".into(),
        };
        assert_eq!(render_message("release ${VERSION}", &env), "release v2.0.0");
        assert_eq!(
            render_message("${PREVIOUS_VERSION} -> ${VERSION} ${OTHER} $VERSION", &env),
            "v1.9.9 -> v2.0.0 ${OTHER} $VERSION"
        );
    }
}
