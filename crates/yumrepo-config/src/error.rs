use miette::Diagnostic;
use thiserror::Error;
use yumrepo_utils::error::{FileSystemError, PathError, UtilsError};

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(yumrepo_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(yumrepo_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(yumrepo_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(yumrepo_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid repository name: {0:?}")]
    #[diagnostic(
        code(yumrepo_config::invalid_repository),
        help("Repository names must not be empty")
    )]
    InvalidRepository(String),

    #[error("Repository {0:?} has no URL")]
    #[diagnostic(code(yumrepo_config::invalid_repository_url))]
    InvalidRepositoryUrl(String),

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(yumrepo_config::duplicate_repo),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("Repository {0} is disabled")]
    #[diagnostic(
        code(yumrepo_config::repository_disabled),
        help("Set `enabled = true` for the repository in your config file")
    )]
    RepositoryDisabled(String),

    #[error("Invalid cache expiry: {0}")]
    #[diagnostic(
        code(yumrepo_config::invalid_cache_expire),
        help("Use seconds (\"3600\"), a duration such as \"1h30m\", \"always\" or \"never\"")
    )]
    InvalidCacheExpire(String),

    #[error("Invalid HTTP timeout: {0}")]
    #[diagnostic(
        code(yumrepo_config::invalid_http_timeout),
        help("Use seconds (\"30\") or a duration such as \"1m30s\"")
    )]
    InvalidHttpTimeout(String),

    #[error("Invalid log level: {0}")]
    #[diagnostic(
        code(yumrepo_config::invalid_log_level),
        help("Use one of: error, warn, info, debug, trace")
    )]
    InvalidLogLevel(String),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(yumrepo_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(yumrepo_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(yumrepo_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
