use std::time::Duration;

use thiserror::Error;

/// Failures of a single outbound request.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// The embedded `__NEXT_DATA__` payload could not be turned into a `pageProps` tree.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no pageProps payload found: missing #__NEXT_DATA__ script")]
    MissingScript,

    #[error("no pageProps payload found: invalid JSON ({0})")]
    InvalidJson(#[from] serde_json::Error),

    #[error("no pageProps payload found: props.pageProps is not an object")]
    MissingPageProps,
}
