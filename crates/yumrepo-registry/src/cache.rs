//! On-disk cache of fetched metadata documents.
//!
//! Entries live at `<cache root>/<cache key>/<filename>`. An entry younger than
//! the configured expiry is served from disk; anything else is fetched again and
//! atomically replaces the old file, so a failed refresh never leaves a partial
//! document behind.

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufReader, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, trace};
use yumrepo_config::config::CacheSettings;
use yumrepo_dl::{DefaultFetcher, DownloadError, Fetch};
use yumrepo_utils::fs::{ensure_dir_exists, modified_age, write_atomic};

use crate::{
    error::{ErrorContext, RegistryError, Result},
    location::CacheKey,
};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// A readable document, either backed by a cache entry or by an anonymous
/// temporary file that disappears when the stream is dropped.
pub struct DocumentStream {
    reader: BufReader<File>,
    path: Option<PathBuf>,
}

impl DocumentStream {
    fn cached(path: PathBuf) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("opening cached document {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            path: Some(path),
        })
    }

    fn ephemeral(file: File) -> Self {
        Self {
            reader: BufReader::new(file),
            path: None,
        }
    }

    /// Cache entry backing this stream, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.path.is_some()
    }
}

impl Read for DocumentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for DocumentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStream")
            .field("path", &self.path)
            .finish()
    }
}

/// Fetches documents through a [`Fetch`] backend and keeps them on disk
/// according to a [`CacheSettings`] policy.
#[derive(Clone)]
pub struct CacheStore {
    settings: CacheSettings,
    fetcher: Arc<dyn Fetch>,
}

impl CacheStore {
    /// Creates a store that retrieves documents with the [`DefaultFetcher`].
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_fetcher(settings, Arc::new(DefaultFetcher::new()))
    }

    pub fn with_fetcher(settings: CacheSettings, fetcher: Arc<dyn Fetch>) -> Self {
        Self { settings, fetcher }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn entry_path(&self, namespace: &CacheKey, filename: &str) -> PathBuf {
        self.settings.path.join(namespace.as_str()).join(filename)
    }

    /// Whether the entry at `path` exists and is younger than the expiry.
    ///
    /// An entry with a modification time in the future counts as fresh.
    pub fn is_fresh(&self, path: &Path) -> bool {
        modified_age(path).is_some_and(|age| age < self.settings.expire)
    }

    /// Returns a readable stream for `filename` in `namespace`.
    ///
    /// With caching disabled the document is fetched into an anonymous temporary
    /// file. With caching enabled a fresh entry is reused; otherwise `source` is
    /// fetched and the entry is atomically replaced. When the fetch fails the
    /// existing entry, if any, is left untouched.
    pub fn fetch_cached(
        &self,
        namespace: &CacheKey,
        filename: &str,
        source: &str,
    ) -> Result<DocumentStream> {
        if !self.settings.enabled {
            debug!("Caching disabled, fetching {} from {}", filename, source);
            let mut body = self.fetcher.fetch(source)?;
            let mut scratch =
                tempfile::tempfile().with_context(|| "creating temporary file".to_string())?;
            let written = copy_body(&mut body, &mut scratch, source)?;
            scratch
                .seek(SeekFrom::Start(0))
                .with_context(|| "rewinding temporary file".to_string())?;
            trace!("Fetched {} bytes of {}", written, filename);
            return Ok(DocumentStream::ephemeral(scratch));
        }

        let path = self.entry_path(namespace, filename);
        if self.is_fresh(&path) {
            debug!("Using cached {} at {}", filename, path.display());
            return DocumentStream::cached(path);
        }

        debug!("Fetching {} from {}", filename, source);
        let mut body = self.fetcher.fetch(source)?;

        let dir = path.parent();
        let created = dir.is_some_and(|dir| !dir.exists());
        if let Some(dir) = dir {
            ensure_dir_exists(dir)?;
        }
        let written = match write_atomic(&path, |file| copy_body(&mut body, file, source)) {
            Ok(written) => written,
            Err(err) => {
                // Only removes the namespace directory if nothing else landed in it.
                if let Some(dir) = dir.filter(|_| created) {
                    let _ = fs::remove_dir(dir);
                }
                return Err(err);
            }
        };
        debug!(
            "Cached {} bytes of {} at {}",
            written,
            filename,
            path.display()
        );

        DocumentStream::cached(path)
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Streams `body` into `out`, telling read failures (the transfer) apart from
/// write failures (the local disk).
fn copy_body<R, W>(body: &mut R, out: &mut W, source: &str) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write,
{
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(RegistryError::Retrieval(DownloadError::Interrupted {
                    location: source.to_string(),
                    source: err,
                }));
            }
        };

        out.write_all(&buffer[..n])
            .with_context(|| format!("writing document fetched from {source}"))?;
        written += n as u64;
    }

    out.flush()
        .with_context(|| format!("flushing document fetched from {source}"))?;
    Ok(written)
}
