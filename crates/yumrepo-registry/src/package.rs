//! Packages listed in a repository's `primary` document.

use std::{fmt, sync::OnceLock};

use roxmltree::Node;
use tracing::warn;

use crate::{extract::RecordFragment, list::Record, query};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct PackageFields {
    name: String,
    arch: String,
    epoch: String,
    version: String,
    release: String,
    summary: String,
    description: String,
    url: String,
    location: String,
    checksum: String,
    packager: String,
    build_time: i64,
    package_size: u64,
    src_rpm: String,
    group: String,
    vendor: String,
    license: String,
    provides: Vec<String>,
    requires: Vec<String>,
}

impl PackageFields {
    fn read(node: Node<'_, '_>) -> Self {
        Self {
            name: query::text(node, "name"),
            arch: query::text(node, "arch"),
            epoch: query::text(node, "version/@epoch"),
            version: query::text(node, "version/@ver"),
            release: query::text(node, "version/@rel"),
            summary: query::text(node, "summary"),
            description: query::text(node, "description"),
            url: query::text(node, "url"),
            location: query::text(node, "location/@href"),
            checksum: query::text(node, "checksum"),
            packager: query::text(node, "packager"),
            build_time: query::text(node, "time/@build").trim().parse().unwrap_or(0),
            package_size: query::text(node, "size/@package").trim().parse().unwrap_or(0),
            src_rpm: query::text(node, "format/sourcerpm"),
            group: query::text(node, "format/group"),
            vendor: query::text(node, "format/vendor"),
            license: query::text(node, "format/license"),
            provides: query::values(node, "format/provides/entry/@name"),
            requires: query::values(node, "format/requires/entry/@name"),
        }
    }
}

/// One `<package>` of the primary document.
///
/// Only the raw fragment is kept until a field is first read; the fragment is
/// then parsed once and every field is cached.
pub struct PackageRecord {
    fragment: RecordFragment,
    fields: OnceLock<PackageFields>,
}

impl PackageRecord {
    pub fn new(fragment: RecordFragment) -> Self {
        Self {
            fragment,
            fields: OnceLock::new(),
        }
    }

    pub fn fragment(&self) -> &RecordFragment {
        &self.fragment
    }

    fn fields(&self) -> &PackageFields {
        self.fields.get_or_init(|| {
            self.fragment.view(PackageFields::read).unwrap_or_else(|err| {
                warn!("Failed to parse package record: {}", err);
                PackageFields::default()
            })
        })
    }

    pub fn name(&self) -> &str {
        &self.fields().name
    }

    pub fn arch(&self) -> &str {
        &self.fields().arch
    }

    /// Epoch as written in the metadata, usually `"0"`.
    pub fn epoch(&self) -> &str {
        &self.fields().epoch
    }

    pub fn version(&self) -> &str {
        &self.fields().version
    }

    pub fn release(&self) -> &str {
        &self.fields().release
    }

    pub fn summary(&self) -> &str {
        &self.fields().summary
    }

    pub fn description(&self) -> &str {
        &self.fields().description
    }

    /// Upstream project URL.
    pub fn url(&self) -> &str {
        &self.fields().url
    }

    /// Package file path relative to the repository root.
    pub fn location(&self) -> &str {
        &self.fields().location
    }

    pub fn checksum(&self) -> &str {
        &self.fields().checksum
    }

    pub fn packager(&self) -> &str {
        &self.fields().packager
    }

    /// Build time in seconds since the epoch; 0 when absent.
    pub fn build_time(&self) -> i64 {
        self.fields().build_time
    }

    /// Size of the package file in bytes; 0 when absent.
    pub fn package_size(&self) -> u64 {
        self.fields().package_size
    }

    pub fn src_rpm(&self) -> &str {
        &self.fields().src_rpm
    }

    pub fn group(&self) -> &str {
        &self.fields().group
    }

    pub fn vendor(&self) -> &str {
        &self.fields().vendor
    }

    pub fn license(&self) -> &str {
        &self.fields().license
    }

    pub fn provides(&self) -> &[String] {
        &self.fields().provides
    }

    pub fn requires(&self) -> &[String] {
        &self.fields().requires
    }

    /// `name-[epoch:]version-release.arch`, omitting a zero or empty epoch.
    pub fn nevra(&self) -> String {
        let fields = self.fields();
        match fields.epoch.as_str() {
            "" | "0" => {
                format!(
                    "{}-{}-{}.{}",
                    fields.name, fields.version, fields.release, fields.arch
                )
            }
            epoch => {
                format!(
                    "{}-{}:{}-{}.{}",
                    fields.name, epoch, fields.version, fields.release, fields.arch
                )
            }
        }
    }
}

impl Record for PackageRecord {
    const ROLE: &'static str = "primary";

    fn from_fragment(fragment: RecordFragment) -> Self {
        Self::new(fragment)
    }
}

impl fmt::Debug for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageRecord")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("release", &self.release())
            .field("arch", &self.arch())
            .finish()
    }
}
