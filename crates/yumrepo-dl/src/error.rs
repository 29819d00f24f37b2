use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(yumrepo_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme `{scheme}`: {url}")]
    #[diagnostic(
        code(yumrepo_dl::unsupported_scheme),
        help("Use an http://, https:// or file:// location")
    )]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Failed to fetch {url}")]
    #[diagnostic(
        code(yumrepo_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(yumrepo_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error("Failed to open {location}")]
    #[diagnostic(code(yumrepo_dl::io))]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer from {location} was interrupted")]
    #[diagnostic(
        code(yumrepo_dl::interrupted),
        help("The connection dropped while reading the response body")
    )]
    Interrupted {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Wraps `err` as a transport failure for `url`.
    ///
    /// Status-code errors become [`DownloadError::HttpError`]; everything else is reported as
    /// [`DownloadError::Network`].
    pub fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::HttpError {
                status,
                url: url.to_string(),
            },
            other => Self::Network {
                url: url.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
