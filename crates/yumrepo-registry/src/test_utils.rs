//! In-memory fetcher and repository fixtures shared by the crate's tests.

use std::{
    collections::{HashMap, HashSet},
    io::{Cursor, Read, Write},
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use flate2::{write::GzEncoder, Compression};
use yumrepo_config::config::CacheSettings;
use yumrepo_dl::{ByteStream, DownloadError, Fetch};

use crate::cache::CacheStore;

pub const REPO_URL: &str = "https://mirror.example.com/centos/6/os/x86_64";

pub const PRIMARY_HREF: &str = "repodata/6f0a-primary.xml.gz";
pub const OTHER_HREF: &str = "repodata/91cc-other.xml.gz";

pub const REPOMD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo" xmlns:rpm="http://linux.duke.edu/metadata/rpm">
  <revision>1316449116</revision>
  <data type="primary">
    <checksum type="sha256">6f0a</checksum>
    <location href="repodata/6f0a-primary.xml.gz"/>
    <timestamp>1316449117</timestamp>
    <size>1234</size>
  </data>
  <data type="other">
    <checksum type="sha256">91cc</checksum>
    <location href="repodata/91cc-other.xml.gz"/>
    <timestamp>1316449118</timestamp>
    <size>567</size>
  </data>
  <data type="group">
    <location href="repodata/comps.xml"/>
  </data>
</repomd>
"#;

pub const PRIMARY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xmlns="http://linux.duke.edu/metadata/common" xmlns:rpm="http://linux.duke.edu/metadata/rpm" packages="3">
<package type="rpm">
  <name>readline</name>
  <arch>x86_64</arch>
  <version epoch="0" ver="6.0" rel="3.el6"/>
  <checksum type="sha256" pkgid="YES">e4b1f1ba</checksum>
  <summary>A library for editing typed command lines</summary>
  <description>The Readline library provides a set of functions that allow users to
edit command lines.</description>
  <packager>CentOS BuildSystem &lt;http://bugs.centos.org&gt;</packager>
  <url>http://cnswww.cns.cwru.edu/php/chet/readline/rltop.html</url>
  <time file="1309815470" build="1279066455"/>
  <size package="189156" installed="480252" archive="482352"/>
  <location href="Packages/readline-6.0-3.el6.x86_64.rpm"/>
  <format>
    <rpm:license>GPLv3+</rpm:license>
    <rpm:vendor>CentOS</rpm:vendor>
    <rpm:group>System Environment/Libraries</rpm:group>
    <rpm:buildhost>c6b9.bsys.dev.centos.org</rpm:buildhost>
    <rpm:sourcerpm>readline-6.0-3.el6.src.rpm</rpm:sourcerpm>
    <rpm:provides>
      <rpm:entry name="libreadline.so.6()(64bit)"/>
      <rpm:entry name="readline" flags="EQ" epoch="0" ver="6.0" rel="3.el6"/>
    </rpm:provides>
    <rpm:requires>
      <rpm:entry name="ncurses-libs"/>
      <rpm:entry name="libc.so.6()(64bit)"/>
      <rpm:entry name="info" pre="1"/>
    </rpm:requires>
  </format>
</package>
<package type="rpm">
  <name>zlib</name>
  <arch>x86_64</arch>
  <version epoch="0" ver="1.2.3" rel="27.el6"/>
  <checksum type="sha256" pkgid="YES">0a0c1a6b</checksum>
  <summary>The zlib compression and decompression library</summary>
  <description>Zlib is a general-purpose, patent-free, lossless data compression library.</description>
  <packager>CentOS BuildSystem &lt;http://bugs.centos.org&gt;</packager>
  <url>http://www.gzip.org/zlib/</url>
  <time file="1309815470" build="1281657622"/>
  <size package="73020" installed="152864" archive="153548"/>
  <location href="Packages/zlib-1.2.3-27.el6.x86_64.rpm"/>
  <format>
    <rpm:license>zlib and Boost</rpm:license>
    <rpm:vendor>CentOS</rpm:vendor>
    <rpm:group>System Environment/Libraries</rpm:group>
    <rpm:sourcerpm>zlib-1.2.3-27.el6.src.rpm</rpm:sourcerpm>
  </format>
</package>
<package type="rpm">
  <name>bash</name>
  <arch>x86_64</arch>
  <version epoch="1" ver="4.1.2" rel="8.el6.centos"/>
  <checksum type="sha256" pkgid="YES">77dd0a3c</checksum>
  <summary>The GNU Bourne Again shell</summary>
  <description>The GNU Bourne Again shell (Bash) is a shell or command language interpreter.</description>
  <packager>CentOS BuildSystem &lt;http://bugs.centos.org&gt;</packager>
  <url>http://www.gnu.org/software/bash</url>
  <time file="1309815470" build="1305647292"/>
  <size package="928244" installed="3139803" archive="3153504"/>
  <location href="Packages/bash-4.1.2-8.el6.centos.x86_64.rpm"/>
  <format>
    <rpm:license>GPLv3+</rpm:license>
    <rpm:vendor>CentOS</rpm:vendor>
    <rpm:group>System Environment/Shells</rpm:group>
    <rpm:sourcerpm>bash-4.1.2-8.el6.centos.src.rpm</rpm:sourcerpm>
    <rpm:provides>
      <rpm:entry name="bash" flags="EQ" epoch="0" ver="4.1.2" rel="8.el6.centos"/>
    </rpm:provides>
    <rpm:requires/>
  </format>
</package>
</metadata>
"#;

pub const OTHER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<otherdata xmlns="http://linux.duke.edu/metadata/other" packages="2">
<package pkgid="e4b1f1ba" name="readline" arch="x86_64">
  <version epoch="0" ver="6.0" rel="3.el6"/>
  <changelog author="Miroslav Lichvar &lt;mlichvar@redhat.com&gt; - 6.0-2" date="1254744000">- fix rl_completion_display_matches_hook (#524284)</changelog>
  <changelog author="Miroslav Lichvar &lt;mlichvar@redhat.com&gt; - 6.0-3" date="1259841600">- update to 6.0 patchlevel 4
- don't use rpath</changelog>
</package>
<package pkgid="0a0c1a6b" name="zlib" arch="x86_64">
  <version epoch="0" ver="1.2.3" rel="27.el6"/>
  <changelog author="Ivana Varekova &lt;varekova@redhat.com&gt; - 1.2.3-27" date="1280750400">* Resolves: #591317 pc file</changelog>
  <changelog author="Packager &lt;p@example.org&gt; - 20100802git-1" date="1280836800">- snapshot rebuild</changelog>
</package>
</otherdata>
"#;

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A [`Fetch`] backend serving canned responses and counting requests.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    interrupted: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher serving the fixture repository at [`REPO_URL`].
    pub fn repository() -> Self {
        Self::new()
            .with(format!("{REPO_URL}/repodata/repomd.xml"), REPOMD_XML)
            .with(format!("{REPO_URL}/{PRIMARY_HREF}"), gzip(PRIMARY_XML.as_bytes()))
            .with(format!("{REPO_URL}/{OTHER_HREF}"), gzip(OTHER_XML.as_bytes()))
    }

    pub fn with<U: Into<String>, B: Into<Vec<u8>>>(self, url: U, body: B) -> Self {
        self.respond(url, body);
        self
    }

    pub fn respond<U: Into<String>, B: Into<Vec<u8>>>(&self, url: U, body: B) {
        let url = url.into();
        self.failing.lock().unwrap().remove(&url);
        self.interrupted.lock().unwrap().remove(&url);
        self.responses.lock().unwrap().insert(url, body.into());
    }

    /// Makes every later request for `url` fail with a transport error.
    pub fn fail<U: Into<String>>(&self, url: U) {
        self.failing.lock().unwrap().insert(url.into());
    }

    /// Makes every later request for `url` send `partial` and then drop the
    /// connection.
    pub fn interrupt<U: Into<String>, B: Into<Vec<u8>>>(&self, url: U, partial: B) {
        self.interrupted
            .lock()
            .unwrap()
            .insert(url.into(), partial.into());
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Fetch for MockFetcher {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(location.to_string())
            .or_default() += 1;

        if self.failing.lock().unwrap().contains(location) {
            return Err(DownloadError::Interrupted {
                location: location.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
            });
        }

        if let Some(partial) = self.interrupted.lock().unwrap().get(location) {
            let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
            return Ok(Box::new(Cursor::new(partial.clone()).chain(BrokenBody(Some(reset)))));
        }

        match self.responses.lock().unwrap().get(location) {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => {
                Err(DownloadError::HttpError {
                    status: 404,
                    url: location.to_string(),
                })
            }
        }
    }
}

/// Reader that fails once with the stored error.
struct BrokenBody(Option<std::io::Error>);

impl Read for BrokenBody {
    fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
        match self.0.take() {
            Some(err) => Err(err),
            None => Ok(0),
        }
    }
}

pub fn cache_store(root: &Path, expire: Duration, enabled: bool, fetcher: &Arc<MockFetcher>) -> CacheStore {
    CacheStore::with_fetcher(CacheSettings::new(root, expire, enabled), fetcher.clone())
}
