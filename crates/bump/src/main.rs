//! bump CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bump::{Cli, commands};
use bump_core::config::ConfigLoader;
use bump_core::git::GitRepo;
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let output = commands::Output {
        quiet: cli.quiet,
        json: cli.json,
    };
    let Some(kind) = cli.command.unwrap_or_default().bump_kind() else {
        return commands::version::cmd_version(output);
    };
    let options = cli.release_options()?;

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let repo = GitRepo::discover(&cwd).context("failed to open git repository")?;

    let mut loader = ConfigLoader::new().with_project_root(repo.root());
    if let Some(ref config_path) = cli.config {
        let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let _guard = observability::init_observability(
        &obs_config,
        observability::file_filter(cli.quiet, cli.debug, config.log_level.as_str()),
        observability::stderr_filter(cli.quiet, cli.debug),
    )
    .context("failed to initialize logging/tracing")?;

    debug!(
        %kind,
        debug = cli.debug,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        root = %repo.root(),
        "CLI initialized"
    );

    let result = commands::release::cmd_release(kind, &options, output, &repo, &config);
    if let Err(ref err) = result {
        let chain = format!("{err:#}");
        tracing::error!(target: observability::FATAL_TARGET, error = %chain, "fatal error");
    }
    result
}
