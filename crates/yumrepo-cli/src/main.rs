use std::path::PathBuf;

use changelog::show_changelog;
use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use packages::list_packages;
use roles::list_roles;
use tracing::{debug, info};
use utils::disable_color;
use yumrepo_config::{
    config::{default_config_path, generate_default_config, Config},
    error::ConfigError,
};
use yumrepo_dl::http_client::configure_http_client;
use yumrepo_registry::{CacheStore, RegistryError, RepositoryLocation};
use yumrepo_utils::path::resolve_path;

mod changelog;
mod cli;
mod logging;
mod packages;
mod roles;
mod utils;

type CliResult<T> = std::result::Result<T, RegistryError>;

fn config_path(args: &Args) -> Result<PathBuf, ConfigError> {
    match &args.config {
        Some(path) => Ok(resolve_path(path)?),
        None => Ok(default_config_path()),
    }
}

/// Resolves `repo` to a location and builds the cache it is read through.
///
/// A configured repository name picks up that repository's expiry override.
fn open_repository(
    config: &Config,
    repo: &str,
    no_cache: bool,
) -> CliResult<(RepositoryLocation, CacheStore)> {
    let url = config.resolve_repository(repo)?;
    let mut settings = match config.get_repository(repo) {
        Some(repository) => config.cache_settings_for(repository)?,
        None => config.cache_settings()?,
    };
    if no_cache {
        settings.enabled = false;
    }

    let location = RepositoryLocation::new(url)?;
    debug!(
        repo = %location,
        cache = %settings.path.display(),
        expire = ?settings.expire,
        enabled = settings.enabled,
        "resolved repository"
    );

    Ok((location, CacheStore::new(settings)))
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    if args.no_color {
        disable_color();
    }

    let path = config_path(&args)?;
    let config = Config::load(&path);
    let log_level = config
        .as_ref()
        .map(|config| config.log_level().to_string())
        .unwrap_or_else(|_| "info".to_string());
    setup_logging(&args, &log_level);
    let config = config?;

    let user_agent = args.user_agent.clone().or_else(|| config.user_agent.clone());
    let timeout = config.http_timeout();
    configure_http_client(|client| {
        if let Some(user_agent) = user_agent {
            client.user_agent = Some(user_agent);
        }
        client.timeout = timeout;
    });

    match args.command {
        Commands::Packages {
            repo,
            deps,
        } => {
            let (location, cache) = open_repository(&config, &repo, args.no_cache)?;
            list_packages(location, cache, deps)
        }
        Commands::Changelog {
            repo,
            package,
        } => {
            let (location, cache) = open_repository(&config, &repo, args.no_cache)?;
            show_changelog(location, cache, package.as_deref())
        }
        Commands::Roles {
            repo,
        } => {
            let (location, cache) = open_repository(&config, &repo, args.no_cache)?;
            list_roles(location, cache)
        }
        Commands::Config {
            init,
        } => {
            if init {
                generate_default_config(&path)?;
            } else {
                let document = config.to_annotated_document()?;
                info!("{}", document.to_string().trim_end());
            }
            Ok(())
        }
    }
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
