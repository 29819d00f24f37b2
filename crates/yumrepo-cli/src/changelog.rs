use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use tracing::{debug, info, warn};
use yumrepo_registry::{CacheStore, PackageChangelogList, RepositoryLocation, Result};

use crate::utils::Colored;

pub fn show_changelog(
    location: RepositoryLocation,
    cache: CacheStore,
    package: Option<&str>,
) -> Result<()> {
    debug!(repo = %location, package = package, "reading changelogs");

    let records = PackageChangelogList::new(location, cache)?;
    let mut shown = 0;

    for record in records
        .iter()
        .filter(|record| package.map_or(true, |name| record.name() == name))
    {
        shown += 1;
        info!(
            name = record.name(),
            version = record.version(),
            release = record.release(),
            arch = record.arch(),
            "{}-{}-{}.{}",
            Colored(Blue, record.name()),
            record.version(),
            record.release(),
            record.arch()
        );

        for entry in record.changelogs() {
            let date = entry
                .date()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());

            info!(
                name = record.name(),
                author = entry.author.as_str(),
                version = entry.version.as_deref(),
                timestamp = entry.timestamp,
                summary = entry.summary.as_str(),
                "  {} {} {}\n    {}",
                Colored(Cyan, date),
                entry.author,
                Colored(Green, entry.version.as_deref().unwrap_or("?")),
                entry.summary.replace('\n', "\n    ")
            );
        }
    }

    match package {
        Some(name) if shown == 0 => {
            warn!("No changelog for {} in {}", name, records.location());
        }
        _ => {
            info!(
                total = shown,
                "{} packages with changelogs",
                Colored(Yellow, shown)
            );
        }
    }

    Ok(())
}
