use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info, warn};
use yumrepo_utils::{
    path::{resolve_path, xdg_cache_home, xdg_config_home},
    time::parse_duration,
};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    repository::{parse_expiry, Repository},
};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "YUMREPO_CONFIG";

/// Environment variable overriding the cache directory.
pub const CACHE_ENV: &str = "YUMREPO_CACHE";

pub const DEFAULT_CACHE_EXPIRE: Duration = Duration::from_secs(3600);

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// yumrepo configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Directory holding cached repository metadata.
    /// Default: $XDG_CACHE_HOME/yumrepo
    pub cache_path: Option<String>,

    /// Maximum age of cached metadata before it is fetched again.
    /// Accepts seconds ("3600"), durations ("30m", "1d12h"), "always" or "never".
    /// Default: 3600
    pub cache_expire: Option<String>,

    /// Whether fetched metadata is kept on disk.
    /// Default: true
    pub cache_enabled: Option<bool>,

    /// Log verbosity: error, warn, info, debug or trace.
    /// Default: info
    pub log_level: Option<String>,

    /// User agent sent with HTTP requests.
    pub user_agent: Option<String>,

    /// Time limit for a single HTTP request, body included ("30s", "2m").
    /// Default: unlimited
    pub http_timeout: Option<String>,

    /// Named repositories that can be referred to instead of a URL.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// Resolved cache policy handed to the metadata cache.
///
/// Built once from a [`Config`] and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root directory of the cache; namespaces are created below it on demand.
    pub path: PathBuf,
    /// Entries older than this are fetched again.
    pub expire: Duration,
    /// When false every document is fetched into a throwaway temporary file.
    pub enabled: bool,
}

impl CacheSettings {
    pub fn new<P: Into<PathBuf>>(path: P, expire: Duration, enabled: bool) -> Self {
        Self {
            path: path.into(),
            expire,
            enabled,
        }
    }
}

/// Returns the configuration file location.
///
/// `$YUMREPO_CONFIG` wins; otherwise `$XDG_CONFIG_HOME/yumrepo/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => xdg_config_home().join("yumrepo").join("config.toml"),
    }
}

impl Config {
    /// Configuration with every optional value filled in.
    pub fn default_config() -> Self {
        Self {
            cache_path: Some("$XDG_CACHE_HOME/yumrepo".to_string()),
            cache_expire: Some(DEFAULT_CACHE_EXPIRE.as_secs().to_string()),
            cache_enabled: Some(true),
            log_level: Some("info".to_string()),
            user_agent: None,
            http_timeout: None,
            repositories: Vec::new(),
        }
    }

    /// Loads the configuration from [`default_config_path`].
    pub fn new() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Loads the configuration from `path`.
    ///
    /// A missing file yields [`Config::default_config`]; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Validates the configuration and fills in defaults.
    pub fn resolve(&mut self) -> Result<()> {
        if let Some(expire) = &self.cache_expire {
            if parse_expiry(expire).is_none() {
                return Err(ConfigError::InvalidCacheExpire(expire.clone()));
            }
        }

        if let Some(timeout) = &self.http_timeout {
            if parse_duration(timeout).is_none() {
                return Err(ConfigError::InvalidHttpTimeout(timeout.clone()));
            }
        }

        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidLogLevel(level.clone()));
            }
        }

        self.cache_enabled.get_or_insert(true);

        let mut seen_repos = HashSet::new();

        for repo in &mut self.repositories {
            if repo.name.trim().is_empty() {
                return Err(ConfigError::InvalidRepository(repo.name.clone()));
            }
            if repo.url.trim().is_empty() {
                return Err(ConfigError::InvalidRepositoryUrl(repo.name.clone()));
            }
            if !seen_repos.insert(repo.name.clone()) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }
            if let Some(expire) = &repo.cache_expire {
                if parse_expiry(expire).is_none() {
                    return Err(ConfigError::InvalidCacheExpire(expire.clone()));
                }
            }

            repo.enabled.get_or_insert(true);
        }

        Ok(())
    }

    /// Returns the cache root.
    ///
    /// `$YUMREPO_CACHE` wins over `cache_path`, which wins over `$XDG_CACHE_HOME/yumrepo`.
    pub fn get_cache_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var(CACHE_ENV) {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(cache_path) = &self.cache_path {
            return Ok(resolve_path(cache_path)?);
        }
        Ok(xdg_cache_home().join("yumrepo"))
    }

    pub fn cache_expire(&self) -> Duration {
        match self.cache_expire.as_deref() {
            None => DEFAULT_CACHE_EXPIRE,
            Some(value) => parse_expiry(value).unwrap_or_else(|| {
                warn!("Invalid cache_expire '{}', using default", value);
                DEFAULT_CACHE_EXPIRE
            }),
        }
    }

    /// Configured HTTP request limit; `None` when unset or zero.
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
            .as_deref()
            .and_then(parse_duration)
            .filter(|timeout| !timeout.is_zero())
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Resolves the global cache policy.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        Ok(CacheSettings::new(
            self.get_cache_path()?,
            self.cache_expire(),
            self.is_cache_enabled(),
        ))
    }

    /// Resolves the cache policy for `repo`, honouring its `cache_expire` override.
    pub fn cache_settings_for(&self, repo: &Repository) -> Result<CacheSettings> {
        let mut settings = self.cache_settings()?;
        if let Some(expire) = repo.cache_expire() {
            settings.expire = expire;
        }
        Ok(settings)
    }

    pub fn get_repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    /// Maps a configured repository name to its URL; anything else is taken as a URL.
    ///
    /// # Errors
    ///
    /// [`ConfigError::RepositoryDisabled`] if `name_or_url` names a disabled repository.
    pub fn resolve_repository<'a>(&'a self, name_or_url: &'a str) -> Result<&'a str> {
        match self.get_repository(name_or_url) {
            Some(repo) if !repo.is_enabled() => {
                Err(ConfigError::RepositoryDisabled(repo.name.clone()))
            }
            Some(repo) => Ok(&repo.url),
            None => Ok(name_or_url),
        }
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(repositories) = doc
            .get_mut("repositories")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<Repository>(repositories)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated default configuration to `path`.
///
/// # Errors
///
/// [`ConfigError::ConfigAlreadyExists`] if a file is already present at `path`.
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated = Config::default_config().to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, annotated.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}
