//! The repository manifest (`repodata/repomd.xml`) and per-role document
//! resolution.

use std::{collections::HashMap, io::Read};

use roxmltree::Document;
use tracing::{debug, trace};

use crate::{
    cache::{CacheStore, DocumentStream},
    error::{ErrorContext, RegistryError, Result},
    location::{CacheKey, RepositoryLocation},
    query,
};

/// Cache filename of the manifest.
pub const MANIFEST_FILENAME: &str = "repomd.xml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checksum {
    pub kind: String,
    pub value: String,
}

/// One `<data>` element of the manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub role: String,
    /// Document path relative to the repository root.
    pub href: String,
    pub checksum: Option<Checksum>,
    pub timestamp: Option<i64>,
    pub size: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    revision: Option<String>,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).map_err(|err| RegistryError::parse(MANIFEST_FILENAME, err))?;
        let root = doc.root_element();
        if root.tag_name().name() != "repomd" {
            return Err(RegistryError::parse(
                MANIFEST_FILENAME,
                format!("unexpected root element <{}>", root.tag_name().name()),
            ));
        }

        let mut entries = Vec::new();
        for data in query::elements(root, "data") {
            let role = query::text(data, "@type");
            let href = query::text(data, "location/@href");
            if role.is_empty() || href.is_empty() {
                debug!("Skipping manifest entry without type or location");
                continue;
            }

            let checksum = query::elements(data, "checksum")
                .first()
                .map(|node| {
                    Checksum {
                        kind: query::text(*node, "@type"),
                        value: query::text_content(*node).trim().to_string(),
                    }
                });

            entries.push(ManifestEntry {
                role,
                href,
                checksum,
                timestamp: query::text(data, "timestamp").trim().parse().ok(),
                size: query::text(data, "size").trim().parse().ok(),
            });
        }

        let revision = Some(query::text(root, "revision").trim().to_string())
            .filter(|revision| !revision.is_empty());

        Ok(Self { revision, entries })
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Entries declared for `role`, in document order.
    pub fn entries_for<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a ManifestEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.role == role)
    }

    /// Distinct roles in document order.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !roles.contains(&entry.role.as_str()) {
                roles.push(&entry.role);
            }
        }
        roles
    }
}

/// Fetches a repository's manifest and opens the documents it lists.
///
/// Documents are opened at most once per resolver and stay open until
/// [`ManifestResolver::close`] is called for their role.
pub struct ManifestResolver {
    location: RepositoryLocation,
    cache_key: CacheKey,
    cache: CacheStore,
    manifest: Manifest,
    open: HashMap<String, DocumentStream>,
}

impl ManifestResolver {
    pub fn new(location: RepositoryLocation, cache: CacheStore) -> Result<Self> {
        let cache_key = location.cache_key();
        let url = location.manifest_url();

        let mut stream = cache
            .fetch_cached(&cache_key, MANIFEST_FILENAME, &url)
            .map_err(|err| {
                match err {
                    RegistryError::Retrieval(source) => {
                        RegistryError::ManifestUnavailable {
                            url: url.clone(),
                            source,
                        }
                    }
                    other => other,
                }
            })?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .with_context(|| format!("reading {MANIFEST_FILENAME}"))?;
        let xml = String::from_utf8(raw).map_err(|err| RegistryError::parse(MANIFEST_FILENAME, err))?;
        let manifest = Manifest::parse(&xml)?;
        trace!(
            "Manifest of {} lists roles {:?}",
            location,
            manifest.roles()
        );

        Ok(Self {
            location,
            cache_key,
            cache,
            manifest,
            open: HashMap::new(),
        })
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Absolute locations of every document declared for `role`.
    pub fn locations_for(&self, role: &str) -> Vec<String> {
        self.manifest
            .entries_for(role)
            .map(|entry| self.location.join(&entry.href))
            .collect()
    }

    /// Returns the open document for `role`, fetching it on first use.
    ///
    /// When the manifest lists several documents for a role the first one is
    /// used.
    pub fn resolved_document(&mut self, role: &str) -> Result<&mut DocumentStream> {
        if !self.open.contains_key(role) {
            let source = self
                .locations_for(role)
                .into_iter()
                .next()
                .ok_or_else(|| RegistryError::RoleNotFound(role.to_string()))?;
            let filename = format!("{role}.xml.gz");
            let stream = self.cache.fetch_cached(&self.cache_key, &filename, &source)?;
            self.open.insert(role.to_string(), stream);
        }

        self.open
            .get_mut(role)
            .ok_or_else(|| RegistryError::RoleNotFound(role.to_string()))
    }

    /// Drops the open document for `role`. Returns whether one was open.
    pub fn close(&mut self, role: &str) -> bool {
        self.open.remove(role).is_some()
    }
}
