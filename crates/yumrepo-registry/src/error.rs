//! Error types for the registry crate.
//!
//! This module defines [`RegistryError`], the error type used throughout
//! the crate, along with helper traits for error context.

use miette::Diagnostic;
use thiserror::Error;
use yumrepo_config::error::ConfigError;
use yumrepo_dl::DownloadError;
use yumrepo_utils::error::FileSystemError;

/// Errors that can occur while reading repository metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(yumrepo_registry::io))]
    Io {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(
        code(yumrepo_registry::retrieval),
        help("Check your network connection and the repository URL")
    )]
    Retrieval(#[from] DownloadError),

    #[error("Repository manifest unavailable at {url}")]
    #[diagnostic(
        code(yumrepo_registry::manifest_unavailable),
        help("Make sure the URL points at a repository root that contains repodata/repomd.xml")
    )]
    ManifestUnavailable {
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("Role `{0}` is not listed in the repository manifest")]
    #[diagnostic(
        code(yumrepo_registry::role_not_found),
        help("Run `yumrepo roles <repo>` to see which documents the repository publishes")
    )]
    RoleNotFound(String),

    #[error("Failed to parse {document}: {reason}")]
    #[diagnostic(
        code(yumrepo_registry::metadata_parse),
        help("The metadata file may be corrupted or in an invalid format")
    )]
    MetadataParse { document: String, reason: String },

    #[error("Invalid repository URL: {0}")]
    #[diagnostic(
        code(yumrepo_registry::invalid_url),
        help("Use an http(s):// URL, a file:// URL or an absolute path")
    )]
    InvalidUrl(String),

    #[error(transparent)]
    #[diagnostic(code(yumrepo_registry::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(yumrepo_registry::config))]
    Config(#[from] ConfigError),
}

impl RegistryError {
    pub(crate) fn parse<D, R>(document: D, reason: R) -> Self
    where
        D: Into<String>,
        R: ToString,
    {
        RegistryError::MetadataParse {
            document: document.into(),
            reason: reason.to_string(),
        }
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::Io {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::RoleNotFound("filelists".to_string());
        assert_eq!(
            err.to_string(),
            "Role `filelists` is not listed in the repository manifest"
        );

        let err = RegistryError::parse("primary.xml.gz", "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Failed to parse primary.xml.gz: unexpected end of file"
        );

        let err = RegistryError::InvalidUrl("bad-url".to_string());
        assert_eq!(err.to_string(), "Invalid repository URL: bad-url");
    }

    #[test]
    fn test_with_context() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.with_context(|| "reading repomd.xml".to_string()).unwrap_err();
        assert!(err.to_string().starts_with("Error while reading repomd.xml"));
    }
}
