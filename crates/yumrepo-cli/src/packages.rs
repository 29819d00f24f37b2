use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Yellow};
use tracing::{debug, info};
use yumrepo_registry::{CacheStore, PackageList, RepositoryLocation, Result};

use crate::utils::{format_size, Colored};

pub fn list_packages(location: RepositoryLocation, cache: CacheStore, deps: bool) -> Result<()> {
    debug!(repo = %location, deps = deps, "listing packages");

    let packages = PackageList::new(location, cache)?;

    for package in &packages {
        info!(
            name = package.name(),
            epoch = package.epoch(),
            version = package.version(),
            release = package.release(),
            arch = package.arch(),
            license = package.license(),
            size = package.package_size(),
            summary = package.summary(),
            "{} | {} | {} - {}",
            Colored(Blue, package.nevra()),
            Colored(LightRed, package.license()),
            format_size(package.package_size()),
            package.summary()
        );

        if !deps {
            continue;
        }

        if !package.provides().is_empty() {
            info!(
                name = package.name(),
                provides = ?package.provides(),
                "    {} {}",
                Colored(Green, "provides:"),
                package.provides().join(", ")
            );
        }
        if !package.requires().is_empty() {
            info!(
                name = package.name(),
                requires = ?package.requires(),
                "    {} {}",
                Colored(Cyan, "requires:"),
                package.requires().join(", ")
            );
        }
    }

    info!(
        total = packages.len(),
        "{} packages in {}",
        Colored(Yellow, packages.len()),
        packages.location()
    );

    Ok(())
}
