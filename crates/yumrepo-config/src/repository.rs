use std::time::Duration;

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use yumrepo_utils::time::parse_duration;

/// A named YUM repository.
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Repository {
    /// Unique name of the repository.
    pub name: String,

    /// Base URL of the repository, the directory that contains `repodata/`.
    pub url: String,

    /// Whether the repository is enabled.
    /// Default: true
    pub enabled: Option<bool>,

    /// Overrides the global cache_expire for this repository.
    pub cache_expire: Option<String>,
}

impl Repository {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Expiry override for this repository, if one is set and valid.
    pub fn cache_expire(&self) -> Option<Duration> {
        self.cache_expire.as_deref().and_then(parse_expiry)
    }
}

/// Parses an expiry value.
///
/// `"always"` expires immediately, `"never"` keeps entries forever, anything else goes
/// through [`parse_duration`].
pub fn parse_expiry(value: &str) -> Option<Duration> {
    match value.trim() {
        "always" => Some(Duration::ZERO),
        "never" => Some(Duration::MAX),
        other => parse_duration(other),
    }
}
