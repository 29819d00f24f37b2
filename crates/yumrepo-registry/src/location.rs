use std::{fmt, path::Path};

use url::Url;
use yumrepo_utils::hash::digest_hex;

use crate::error::{RegistryError, Result};

/// Path of the manifest below a repository root.
pub const MANIFEST_PATH: &str = "repodata/repomd.xml";

const REPODATA_SUFFIXES: [&str; 2] = ["/repodata/repomd.xml", "/repodata"];

/// Directory name under the cache root that holds one repository's documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized repository root URL.
///
/// Trailing slashes and a trailing `repodata` segment are removed, so
/// `https://mirror/os/`, `https://mirror/os/repodata/` and
/// `https://mirror/os/repodata/repomd.xml` all name the same repository and
/// share one cache namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositoryLocation {
    url: String,
}

impl RepositoryLocation {
    pub fn new(url: &str) -> Result<Self> {
        let normalized = normalize(url);
        if normalized.is_empty() {
            return Err(RegistryError::InvalidUrl(url.to_string()));
        }

        if Url::parse(&normalized).is_err() && !Path::new(&normalized).is_absolute() {
            return Err(RegistryError::InvalidUrl(url.to_string()));
        }

        Ok(Self { url: normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Hex digest of the normalized URL.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(digest_hex(&self.url))
    }

    /// Resolves a manifest `href` against the repository root.
    pub fn join(&self, href: &str) -> String {
        format!("{}/{}", self.url, href.trim_start_matches('/'))
    }

    pub fn manifest_url(&self) -> String {
        self.join(MANIFEST_PATH)
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

fn normalize(url: &str) -> String {
    let mut url = url.trim().trim_end_matches('/');
    for suffix in REPODATA_SUFFIXES {
        if let Some(stripped) = url.strip_suffix(suffix) {
            url = stripped.trim_end_matches('/');
            break;
        }
    }
    url.to_string()
}
