//! HTTP data source

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::DataSource;
use super::FetchResult;
use crate::error::SourceError;
use crate::query::RequestParams;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches pages by POSTing the request payload as JSON to one endpoint.
///
/// The endpoint must answer with `{"data": [...], "totalRows": n}` (or
/// `{"rows": [...], "total": n}`).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::source::HttpDataSource;
///
/// let source = HttpDataSource::new("https://example.org/api/rows")
///     .unwrap()
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    endpoint: Url,
    http_client: Client,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl HttpDataSource {
    /// Creates a source for `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, SourceError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl(format!(
                "unsupported scheme {:?} in {}",
                endpoint.scheme(),
                endpoint
            )));
        }
        Ok(Self {
            endpoint,
            http_client: Client::new(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Uses a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, params: &RequestParams) -> Result<FetchResult, SourceError> {
        log::debug!("POST {} page {} size {}", self.endpoint, params.page, params.page_size);

        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .json(params)
            .timeout(self.timeout);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout)
            } else {
                SourceError::Network(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| SourceError::parse_with_body(e.to_string(), body))
    }
}
