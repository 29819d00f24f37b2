//! Changelogs listed in a repository's `other` document.

use std::{fmt, sync::OnceLock};

use chrono::{DateTime, Utc};
use roxmltree::Node;
use tracing::warn;

use crate::{extract::RecordFragment, list::Record, query, version::extract_version};

/// One `<changelog>` entry of a package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub author: String,
    /// Version named at the end of the author line, if recognisable.
    pub version: Option<String>,
    /// Seconds since the epoch; 0 when absent or malformed.
    pub timestamp: i64,
    /// Entry text with a leading `-` or `*` bullet removed.
    pub summary: String,
}

impl ChangelogEntry {
    fn read(node: Node<'_, '_>) -> Self {
        let author = query::text(node, "@author");
        let version = extract_version(&author).map(str::to_string);

        Self {
            version,
            timestamp: query::text(node, "@date").trim().parse().unwrap_or(0),
            summary: strip_bullet(&query::text_content(node)).to_string(),
            author,
        }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

fn strip_bullet(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix(['-', '*'])
        .map_or(text, str::trim_start)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ChangelogFields {
    name: String,
    arch: String,
    version: String,
    release: String,
    entries: Vec<ChangelogEntry>,
}

impl ChangelogFields {
    fn read(node: Node<'_, '_>) -> Self {
        Self {
            name: query::text(node, "@name"),
            arch: query::text(node, "@arch"),
            version: query::text(node, "version/@ver"),
            release: query::text(node, "version/@rel"),
            entries: query::elements(node, "changelog")
                .into_iter()
                .map(ChangelogEntry::read)
                .collect(),
        }
    }
}

/// One `<package>` of the other document: a package identity and its
/// changelog, oldest entry first as published.
pub struct ChangelogRecord {
    fragment: RecordFragment,
    fields: OnceLock<ChangelogFields>,
}

impl ChangelogRecord {
    pub fn new(fragment: RecordFragment) -> Self {
        Self {
            fragment,
            fields: OnceLock::new(),
        }
    }

    pub fn fragment(&self) -> &RecordFragment {
        &self.fragment
    }

    fn fields(&self) -> &ChangelogFields {
        self.fields.get_or_init(|| {
            self.fragment.view(ChangelogFields::read).unwrap_or_else(|err| {
                warn!("Failed to parse changelog record: {}", err);
                ChangelogFields::default()
            })
        })
    }

    pub fn name(&self) -> &str {
        &self.fields().name
    }

    pub fn arch(&self) -> &str {
        &self.fields().arch
    }

    pub fn version(&self) -> &str {
        &self.fields().version
    }

    pub fn release(&self) -> &str {
        &self.fields().release
    }

    pub fn changelogs(&self) -> &[ChangelogEntry] {
        &self.fields().entries
    }
}

impl Record for ChangelogRecord {
    const ROLE: &'static str = "other";

    fn from_fragment(fragment: RecordFragment) -> Self {
        Self::new(fragment)
    }
}

impl fmt::Debug for ChangelogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangelogRecord")
            .field("name", &self.name())
            .field("entries", &self.changelogs().len())
            .finish()
    }
}
