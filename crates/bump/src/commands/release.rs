//! Release command: a thin CLI layer over `bump_core::release`.

use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use bump_core::bump::BumpKind;
use bump_core::config::Config;
use bump_core::git::GitRepo;
use bump_core::hooks::{HookError, SystemShell};
use bump_core::release::{self, ReleaseError, ReleaseEvent, ReleaseOptions};

use super::Output;

/// Execute a patch, minor, major or prerelease bump.
#[instrument(name = "cmd_release", skip_all, fields(%kind))]
pub fn cmd_release(
    kind: BumpKind,
    options: &ReleaseOptions,
    output: Output,
    repo: &GitRepo,
    config: &Config,
) -> anyhow::Result<()> {
    debug!(
        json_output = output.json,
        dry_run = options.dry_run,
        "executing release command"
    );

    let shell = SystemShell::new(repo.root());

    if output.human() && options.dry_run {
        println!("{}", "DRY RUN: no changes will be made".yellow().bold());
    }

    let mut progress = Progress::new(options.dry_run);
    let result = release::run_release(repo, &shell, config, kind, options, |event| {
        if output.human() {
            progress.handle(event);
        }
    });
    progress.clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            print_hook_stderr(&err);
            return Err(err).context("release failed");
        }
    };

    if output.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !output.quiet {
        println!();
        if outcome.dry_run {
            println!(
                "{} Dry run complete, {} would be tagged",
                "✓".green(),
                outcome.tag.bold(),
            );
        } else {
            println!("{} Tagged {}", "✓".green().bold(), outcome.tag.green().bold());
        }
    }

    Ok(())
}

/// A failing hook's stderr is not part of the error chain, so show it here.
fn print_hook_stderr(err: &ReleaseError) {
    if let ReleaseError::Hook(HookError::CommandFailed { stderr, .. }) = err
        && !stderr.is_empty()
    {
        eprintln!("{}", stderr.dimmed());
    }
}

/// Terminal progress for release events.
struct Progress {
    dry_run: bool,
    spinner: Option<ProgressBar>,
}

impl Progress {
    const fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            spinner: None,
        }
    }

    fn mark(&self) -> &'static str {
        if self.dry_run { "○" } else { "✓" }
    }

    fn start_spinner(&mut self, message: String) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];
            spinner.set_style(style.tick_strings(&frames));
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn handle(&mut self, event: ReleaseEvent) {
        match event {
            ReleaseEvent::Verifying { fetch } => {
                let message = if fetch {
                    "fetching and checking repository..."
                } else {
                    "checking repository..."
                };
                self.start_spinner(message.to_string());
            }
            ReleaseEvent::VersionResolved {
                previous,
                next,
                tags,
            } => {
                self.clear();
                debug!(tags, "version resolved");
                println!(
                    "\n{}: {} → {}\n",
                    "Bump".bold(),
                    previous.to_string().dimmed(),
                    next.to_string().green().bold(),
                );
            }
            ReleaseEvent::HooksStarted {
                commands,
                will_execute,
            } => {
                if will_execute {
                    let count = commands.len();
                    self.start_spinner(format!(
                        "running {count} pre-hook command{}...",
                        if count == 1 { "" } else { "s" }
                    ));
                } else {
                    for command in &commands {
                        println!("  {} {} {}", self.mark().green(), "hook".bold(), command.cyan());
                    }
                }
            }
            ReleaseEvent::HooksSkipped { count } => {
                println!(
                    "  {} {} {}",
                    "–".yellow(),
                    "hook".bold(),
                    format!("skipped: {count} command(s)").dimmed(),
                );
            }
            ReleaseEvent::HooksCompleted { outputs } => {
                self.clear();
                for hook in outputs {
                    println!(
                        "  {} {} {} {}",
                        "✓".green(),
                        "hook".bold(),
                        hook.command.cyan(),
                        format!("({:.1?})", hook.duration).dimmed(),
                    );
                    for line in hook.stdout.lines() {
                        println!("      {line}");
                    }
                }
            }
            ReleaseEvent::Committing {
                message,
                will_execute,
            } => {
                debug!(will_execute, "commit");
                println!("  {} {} {}", self.mark().green(), "commit".bold(), message.dimmed());
            }
            ReleaseEvent::Tagging { tag, will_execute } => {
                debug!(will_execute, "tag");
                println!("  {} {} {}", self.mark().green(), "tag".bold(), tag);
            }
        }
    }
}
