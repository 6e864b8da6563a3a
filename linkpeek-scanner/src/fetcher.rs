use crate::error::{Result, ScanError};
use crate::node::UntypedNode;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// The gate endpoint refuses requests that do not look like they come from a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Proxy URL applied to every request, e.g. `socks5://127.0.0.1:9050`.
    pub proxy: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            user_agent: BROWSER_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

/// Per-call limits handed down from whoever started the extraction.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Drive `request` to completion unless the deadline passes or the token fires first.
    pub async fn run<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .map_err(|_| ScanError::Timeout(limit))?,
                None => request.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScanError::Cancelled),
            result = bounded => result,
        }
    }
}

/// Raw HTTP capability: bytes in, bytes out, no knowledge of profiles.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str, ctx: &CallContext) -> Result<Vec<u8>>;

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &UntypedNode,
        ctx: &CallContext,
    ) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            settings,
        })
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ScanError {
        if err.is_timeout() {
            return ScanError::Timeout(expired_limit(&self.settings, err.is_connect()));
        }
        ScanError::HttpError(err)
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        debug!("Read {} bytes (status {})", body.len(), status.as_u16());
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str, ctx: &CallContext) -> Result<Vec<u8>> {
        let url = parse_url(url)?;
        debug!("GET {}", url);

        ctx.run(async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;
            self.read_body(response).await
        })
        .await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &UntypedNode,
        ctx: &CallContext,
    ) -> Result<Vec<u8>> {
        let url = parse_url(url)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        ctx.run(async {
            let response = request.send().await.map_err(|e| self.map_reqwest_error(e))?;
            self.read_body(response).await
        })
        .await
    }
}

/// The configured limit that ran out: the connect timeout while connecting, the request timeout otherwise.
fn expired_limit(settings: &FetchSettings, during_connect: bool) -> Duration {
    if during_connect {
        settings.connect_timeout
    } else {
        settings.request_timeout
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))
}
