//! Byte retrieval for the yumrepo metadata reader.
//!
//! Everything that touches the network or reads a location goes through the
//! [`traits::Fetch`] trait so that callers can inject their own transport.

pub mod error;
pub mod fetcher;
pub mod http;
pub mod http_client;
pub mod local;
pub mod traits;

pub use error::DownloadError;
pub use fetcher::DefaultFetcher;
pub use traits::{ByteStream, Fetch};
