use linkpeek_scanner::FetchSettings;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://linktr.ee";

/// Accepts sensitive-content gates on behalf of the visitor.
pub const GATES_PATH: &str = "/api/profiles/validation/gates";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scheme and host every profile lives under, without a trailing slash.
    pub base_url: String,
    pub fetch: FetchSettings,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch: FetchSettings::default(),
        }
    }
}

impl ScraperConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_fetch_settings(mut self, fetch: FetchSettings) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/{}", self.base_url, username)
    }

    pub fn gates_url(&self) -> String {
        format!("{}{}", self.base_url, GATES_PATH)
    }

    /// Host part of the base URL, e.g. `linktr.ee`.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}
