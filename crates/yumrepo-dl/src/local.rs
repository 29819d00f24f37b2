use std::{fs::File, io::BufReader, path::PathBuf};

use tracing::debug;
use url::Url;

use crate::{
    error::DownloadError,
    traits::{ByteStream, Fetch},
};

/// Reads `file://` URLs and plain filesystem paths from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    fn to_path(location: &str) -> Result<PathBuf, DownloadError> {
        if !location.starts_with("file:") {
            return Ok(PathBuf::from(location));
        }

        let url = Url::parse(location).map_err(|source| DownloadError::InvalidUrl {
            url: location.to_string(),
            source,
        })?;

        url.to_file_path()
            .map_err(|_| DownloadError::UnsupportedScheme {
                url: location.to_string(),
                scheme: url.scheme().to_string(),
            })
    }
}

impl Fetch for LocalFetcher {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError> {
        let path = Self::to_path(location)?;
        debug!("Reading {}", path.display());

        let file = File::open(&path).map_err(|source| DownloadError::Io {
            location: location.to_string(),
            source,
        })?;

        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Read};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_fetch_file_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repomd.xml");
        fs::write(&path, "<repomd/>").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let mut body = String::new();
        LocalFetcher
            .fetch(url.as_str())
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();

        assert_eq!(body, "<repomd/>");
    }

    #[test]
    fn test_fetch_plain_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primary.xml.gz");
        fs::write(&path, [0x1f, 0x8b]).unwrap();

        let mut body = Vec::new();
        LocalFetcher
            .fetch(path.to_str().unwrap())
            .unwrap()
            .read_to_end(&mut body)
            .unwrap();

        assert_eq!(body, vec![0x1f, 0x8b]);
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.xml");

        let err = LocalFetcher.fetch(path.to_str().unwrap()).err().unwrap();
        assert!(matches!(err, DownloadError::Io { .. }));
    }
}
