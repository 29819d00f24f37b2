use url::Url;

use crate::{
    error::DownloadError,
    http::HttpFetcher,
    local::LocalFetcher,
    traits::{ByteStream, Fetch},
};

/// Dispatches a location to the matching backend by its scheme.
///
/// `http`/`https` go to [`HttpFetcher`]; `file` URLs and strings that do not parse as a URL
/// are treated as local paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    local: LocalFetcher,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetch for DefaultFetcher {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError> {
        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => self.http.fetch(location),
                "file" => self.local.fetch(location),
                scheme => Err(DownloadError::UnsupportedScheme {
                    url: location.to_string(),
                    scheme: scheme.to_string(),
                }),
            },
            Err(_) => self.local.fetch(location),
        }
    }
}
