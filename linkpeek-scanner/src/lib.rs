pub mod document;
pub mod error;
pub mod fetcher;
pub mod node;

pub use document::extract_page_props;
pub use error::{ExtractError, ScanError};
pub use fetcher::{BROWSER_USER_AGENT, CallContext, FetchSettings, Fetcher, ReqwestFetcher};
pub use node::{Coerced, UntypedNode};
pub use tokio_util::sync::CancellationToken;
