//! Profile extraction for linktr.ee pages.
//!
//! [`ProfileScraper`] fetches a profile page, normalizes the embedded account
//! record and resolves its links, including the ones hidden behind a
//! sensitive-content gate.

pub mod config;
pub mod error;
pub mod links;
pub mod model;
pub mod normalize;
pub mod profile;
pub mod report;

pub use config::{DEFAULT_BASE_URL, ScraperConfig};
pub use error::ProfileError;
pub use links::{LinkResolver, ResolutionFailure};
pub use model::{Link, Profile};
pub use profile::{ProfileFailure, ProfileOutcome, ProfileScraper};
