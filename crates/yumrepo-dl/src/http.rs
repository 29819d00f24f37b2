use tracing::debug;

use crate::{
    error::DownloadError,
    http_client::SHARED_AGENT,
    traits::{ByteStream, Fetch},
};

/// Fetches `http://` and `https://` locations through the shared agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError> {
        debug!("GET {}", location);

        let response = SHARED_AGENT
            .get(location)
            .call()
            .map_err(|err| DownloadError::from_ureq(location, err))?;

        Ok(Box::new(response.into_body().into_reader()))
    }
}
