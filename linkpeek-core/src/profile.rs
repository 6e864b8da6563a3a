use crate::config::ScraperConfig;
use crate::error::ProfileError;
use crate::links::LinkResolver;
use crate::model::{Link, Profile};
use crate::normalize::{account, account_id, normalize};
use linkpeek_scanner::{CallContext, Fetcher, ReqwestFetcher, UntypedNode, extract_page_props};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A usable profile. `warnings` lists the non-fatal problems met on the way,
/// such as a failed unlock call.
#[derive(Debug)]
pub struct ProfileOutcome {
    pub profile: Profile,
    /// The `pageProps` tree the profile was built from.
    pub raw: UntypedNode,
    pub warnings: Vec<ProfileError>,
}

impl ProfileOutcome {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// No profile could be built. `raw` is kept whenever the page payload was extracted.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ProfileFailure {
    #[source]
    pub error: ProfileError,
    pub raw: Option<UntypedNode>,
}

impl From<ProfileError> for ProfileFailure {
    fn from(error: ProfileError) -> Self {
        Self { error, raw: None }
    }
}

pub struct ProfileScraper {
    fetcher: Arc<dyn Fetcher>,
    config: ScraperConfig,
}

impl ProfileScraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ProfileError> {
        let fetcher = ReqwestFetcher::new(config.fetch.clone())?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    pub async fn get_profile(
        &self,
        url: Option<&str>,
        username: Option<&str>,
    ) -> Result<ProfileOutcome, ProfileFailure> {
        self.get_profile_with(url, username, &CallContext::new())
            .await
    }

    /// Fetch and assemble a profile from either its URL or its username.
    /// When both are given the URL is fetched.
    pub async fn get_profile_with(
        &self,
        url: Option<&str>,
        username: Option<&str>,
        ctx: &CallContext,
    ) -> Result<ProfileOutcome, ProfileFailure> {
        let url = non_empty(url);
        let target = self.target_url(url, non_empty(username))?;

        info!("Fetching profile {}", target);
        let body = self
            .fetcher
            .get(&target, ctx)
            .await
            .map_err(ProfileError::from)?;

        self.profile_from_html_with(&String::from_utf8_lossy(&body), url, ctx)
            .await
    }

    /// Build a profile from an already fetched page. Gated links still need the network.
    pub async fn profile_from_html(
        &self,
        html: &str,
        url: Option<&str>,
    ) -> Result<ProfileOutcome, ProfileFailure> {
        self.profile_from_html_with(html, url, &CallContext::new())
            .await
    }

    pub async fn profile_from_html_with(
        &self,
        html: &str,
        url: Option<&str>,
        ctx: &CallContext,
    ) -> Result<ProfileOutcome, ProfileFailure> {
        let raw = extract_page_props(html).map_err(ProfileError::from)?;

        let mut profile = match normalize(&raw, non_empty(url), &self.config) {
            Ok(profile) => profile,
            Err(error) => return Err(ProfileFailure { error, raw: Some(raw) }),
        };

        let mut warnings = Vec::new();
        match self.resolve(profile.account_id, &raw, ctx).await {
            Ok(links) => profile.links = links,
            Err((links, error)) => {
                warn!(
                    "Links for {} are incomplete ({} kept): {}",
                    profile.username,
                    links.len(),
                    error
                );
                profile.links = links;
                warnings.push(error);
            }
        }

        info!(
            "Profile {} assembled with {} links",
            profile.username,
            profile.links.len()
        );
        Ok(ProfileOutcome {
            profile,
            raw,
            warnings,
        })
    }

    /// Only the resolved links of a profile. Unlike [`Self::get_profile`], a failed
    /// unlock call is an error here.
    pub async fn get_links(
        &self,
        username: &str,
        ctx: &CallContext,
    ) -> Result<Vec<Link>, ProfileFailure> {
        let target = self.target_url(None, non_empty(Some(username)))?;
        let body = self
            .fetcher
            .get(&target, ctx)
            .await
            .map_err(ProfileError::from)?;
        let raw = extract_page_props(&String::from_utf8_lossy(&body)).map_err(ProfileError::from)?;

        let id = match account(&raw).map(|account| account_id(account).into_inner()) {
            Ok(id) => id,
            Err(error) => return Err(ProfileFailure { error, raw: Some(raw) }),
        };

        match self.resolve(id, &raw, ctx).await {
            Ok(links) => Ok(links),
            Err((_, error)) => Err(ProfileFailure { error, raw: Some(raw) }),
        }
    }

    fn target_url(&self, url: Option<&str>, username: Option<&str>) -> Result<String, ProfileError> {
        match (url, username) {
            (Some(url), _) => Ok(url.to_string()),
            (None, Some(username)) => Ok(self.config.profile_url(username)),
            (None, None) => Err(ProfileError::Input),
        }
    }

    async fn resolve(
        &self,
        account_id: i64,
        raw: &UntypedNode,
        ctx: &CallContext,
    ) -> Result<Vec<Link>, (Vec<Link>, ProfileError)> {
        let raw_links = match raw.get("links") {
            None | Some(UntypedNode::Null) => {
                debug!("pageProps has no links");
                return Ok(Vec::new());
            }
            Some(raw_links) => raw_links,
        };

        LinkResolver::new(self.fetcher.as_ref(), &self.config)
            .resolve_links(account_id, raw_links, ctx)
            .await
            .map_err(|failure| (failure.resolved, failure.error))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
