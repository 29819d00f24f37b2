use nu_ansi_term::Color::{Green, Yellow};
use tracing::{debug, info};
use yumrepo_registry::{CacheStore, ManifestResolver, RepositoryLocation, Result};

use crate::utils::{format_size, Colored};

pub fn list_roles(location: RepositoryLocation, cache: CacheStore) -> Result<()> {
    debug!(repo = %location, "reading manifest");

    let resolver = ManifestResolver::new(location, cache)?;
    let manifest = resolver.manifest();

    if let Some(revision) = manifest.revision() {
        info!(revision = revision, "Revision {}", Colored(Yellow, revision));
    }

    for entry in manifest.entries() {
        let size = entry.size.map(format_size).unwrap_or_default();
        info!(
            role = entry.role.as_str(),
            href = entry.href.as_str(),
            url = %resolver.location().join(&entry.href),
            size = entry.size,
            timestamp = entry.timestamp,
            checksum = entry.checksum.as_ref().map(|c| c.value.as_str()),
            "{:<20} {} {}",
            Colored(Green, &entry.role),
            entry.href,
            size
        );
    }

    Ok(())
}
