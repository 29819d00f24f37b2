//! Version extraction from changelog author lines.
//!
//! Packagers conventionally end the author line with the version the entry
//! belongs to, e.g. `John Doe <jdoe@example.com> - 2.3.4-1`. Only the text after
//! the last `>` is examined so that digits in e-mail addresses never match.

use std::sync::LazyLock;

use regex::Regex;

static STANDARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s:-])v?(\d[0-9A-Za-z]*(?:\.[0-9A-Za-z]+)+(?:-[0-9A-Za-z]+(?:\.[0-9A-Za-z]+)*)?)")
        .expect("unable to compile standard version regex")
});

static ODD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s:-])([0-9A-Za-z]+(?:-[0-9A-Za-z]+)*-[0-9A-Za-z]{1,10})\s*$")
        .expect("unable to compile odd version regex")
});

/// The shapes of version strings recognised in author lines, in order of
/// precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionPattern {
    /// Dotted numeric version with an optional release, e.g. `1.2.3-4.el6`.
    Standard,
    /// A trailing `token-release` without dots, e.g. `20100802git-1`.
    Odd,
}

impl VersionPattern {
    pub const PRECEDENCE: [VersionPattern; 2] = [VersionPattern::Standard, VersionPattern::Odd];

    pub fn find(self, text: &str) -> Option<&str> {
        let re = match self {
            VersionPattern::Standard => &*STANDARD_RE,
            VersionPattern::Odd => &*ODD_RE,
        };
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Returns the version named by a changelog author line, if any.
pub fn extract_version(author: &str) -> Option<&str> {
    let tail = author.rsplit_once('>').map_or(author, |(_, tail)| tail);
    VersionPattern::PRECEDENCE
        .iter()
        .find_map(|pattern| pattern.find(tail))
}
