//! Cached, lazily parsed access to YUM repository metadata.
//!
//! A repository publishes a manifest (`repodata/repomd.xml`) that names one
//! compressed XML document per role. This crate fetches the manifest, resolves
//! role documents through an on-disk cache and exposes their records:
//!
//! - [`PackageList`] reads the `primary` document into [`PackageRecord`]s.
//! - [`PackageChangelogList`] reads the `other` document into
//!   [`ChangelogRecord`]s.
//!
//! Records are cut out of the document in a single streaming pass and parsed
//! only when one of their fields is first read.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use yumrepo_config::config::CacheSettings;
//! use yumrepo_registry::{CacheStore, PackageList};
//!
//! fn list() -> yumrepo_registry::Result<()> {
//!     let settings = CacheSettings::new("/tmp/yumrepo", Duration::from_secs(3600), true);
//!     let packages = PackageList::from_url(
//!         "https://vault.centos.org/6.10/os/x86_64",
//!         CacheStore::new(settings),
//!     )?;
//!
//!     for package in &packages {
//!         println!("{} {}", package.nevra(), package.license());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod changelog;
pub mod compression;
pub mod error;
pub mod extract;
pub mod list;
pub mod location;
pub mod manifest;
pub mod package;
pub mod query;
pub mod version;

#[cfg(test)]
mod test_utils;

pub use cache::{CacheStore, DocumentStream};
pub use changelog::{ChangelogEntry, ChangelogRecord};
pub use error::{ErrorContext, RegistryError, Result};
pub use extract::{RecordFragment, StreamingRecordExtractor};
pub use list::{PackageChangelogList, PackageList, Record, RecordList};
pub use location::{CacheKey, RepositoryLocation};
pub use manifest::{Manifest, ManifestEntry, ManifestResolver};
pub use package::PackageRecord;
pub use version::extract_version;
