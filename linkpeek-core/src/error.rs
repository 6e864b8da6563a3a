use linkpeek_scanner::{ExtractError, ScanError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("please pass a linktree username or url")]
    Input,

    #[error("transport error: {0}")]
    Transport(#[from] ScanError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("cannot coerce {field} value {found} to an integer")]
    Coercion { field: String, found: String },

    #[error("link resolution failed: {0}")]
    Resolution(#[source] ScanError),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
