//! Resilient HTTP client for the REST Countries provider.
//!
//! Provides:
//! - Connection pooling via reqwest
//! - A two-step fallback for name lookups (full-text first, substring second)
//! - Distinct signalling of "no match" versus transport failure

use url::Url;

use crate::config::{Config, api, fields};
use crate::error::{UpstreamError, UpstreamResult};
use crate::models::RawCountry;

/// Client for the country-data provider.
#[derive(Debug, Clone)]
pub struct CountriesClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CountriesClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the upstream URL is invalid or HTTP client
    /// initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.upstream_url)?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "upstream URL must be a base URL");

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "application/json".parse().expect("valid accept header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Fetch countries matching `name`, with the fallback strategy.
    ///
    /// The first attempt asks the provider for a full-name match
    /// (`fullText=true`). If that attempt comes back 400 or 404, the
    /// provider's "no exact match" signals, a single relaxed substring-style
    /// attempt follows. Timeouts, 5xx, and network errors are never retried;
    /// falling back on those would mask real outages.
    ///
    /// An empty result set from either attempt is a legitimate
    /// [`UpstreamError::NotFound`], not a transport failure.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or an upstream error status.
    pub async fn fetch_by_name(&self, name: &str) -> UpstreamResult<Vec<RawCountry>> {
        let mut exact = self.name_url(name);
        exact.query_pairs_mut().append_pair("fullText", "true");

        match self.get_countries(exact).await {
            Ok(countries) if !countries.is_empty() => Ok(countries),
            Ok(_) => Err(UpstreamError::not_found(name)),
            Err(err) if err.triggers_fallback() => {
                tracing::debug!(name, %err, "Exact-match lookup failed, retrying relaxed");
                match self.get_countries(self.name_url(name)).await {
                    Ok(countries) if !countries.is_empty() => Ok(countries),
                    Ok(_) | Err(UpstreamError::Status { status: 404, .. }) => {
                        Err(UpstreamError::not_found(name))
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch the full country dataset in one request.
    ///
    /// No fallback is needed here; filtering and pagination happen locally.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or an upstream error status.
    pub async fn fetch_all(&self) -> UpstreamResult<Vec<RawCountry>> {
        let mut url = self.endpoint("all");
        url.query_pairs_mut().append_pair("fields", &fields::UPSTREAM.join(","));

        self.get_countries(url).await
    }

    fn name_url(&self, name: &str) -> Url {
        let mut url = self.endpoint("name");
        url.path_segments_mut().expect("base URL validated at construction").push(name);
        url
    }

    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut().expect("base URL validated at construction").push(segment);
        url
    }

    /// Make a GET request and parse the country array.
    async fn get_countries(&self, url: Url) -> UpstreamResult<Vec<RawCountry>> {
        let response = self.client.get(url).send().await?;
        let response = Self::handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        serde_json::from_value(value).map_err(UpstreamError::from)
    }

    /// Map non-success status codes to errors.
    async fn handle_response(response: reqwest::Response) -> UpstreamResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(UpstreamError::status(status.as_u16(), text))
    }
}
