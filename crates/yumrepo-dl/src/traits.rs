use std::io::Read;

use crate::error::DownloadError;

/// A readable body returned by a [`Fetch`] implementation.
pub type ByteStream = Box<dyn Read + Send>;

/// Retrieves the bytes behind a location.
///
/// Implementations perform no retries and no caching; failures are reported as
/// [`DownloadError`] and left to the caller.
pub trait Fetch: Send + Sync {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError>;
}

impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    fn fetch(&self, location: &str) -> Result<ByteStream, DownloadError> {
        (**self).fetch(location)
    }
}
