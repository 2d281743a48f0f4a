//! Request-processing pipeline.
//!
//! Each request walks a fixed stage order: rate limit, then auth, then cache
//! lookup, then upstream fetch, shaping, and cache write-through. Stages
//! short-circuit by returning `Err(GatewayError)`; terminal rejections
//! (rate limit, auth) never
//! reach the shaping stage. There is no retry loop above the client's own
//! fallback, and concurrent misses on one key each fetch independently
//! (no single-flight).

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthGuard;
use crate::cache::CacheStore;
use crate::client::CountriesClient;
use crate::config::{Config, api};
use crate::error::{GatewayError, GatewayResult};
use crate::models::CountryRecord;
use crate::rate_limit::{RateDecision, RateLimiter};
use crate::shape;

/// Query parameters for the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// 1-based page number; defaults to 1.
    pub page: Option<i64>,

    /// Page size; defaults to 20.
    pub limit: Option<i64>,

    /// Case-insensitive substring filter on the common name.
    pub search: Option<String>,
}

impl ListParams {
    fn effective_page(&self) -> i64 {
        self.page.unwrap_or(api::DEFAULT_PAGE as i64).max(1)
    }

    fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(api::DEFAULT_LIMIT as i64).max(1)
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Normalized query pairs for cache fingerprinting.
    ///
    /// Defaults and clamping are applied first so `?page=1` and no parameters
    /// share one cache entry. The search term is lowercased because matching
    /// is case-insensitive anyway.
    fn normalized_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.effective_page().to_string()),
            ("limit".to_string(), self.effective_limit().to_string()),
        ];
        if let Some(term) = self.search_term() {
            pairs.push(("search".to_string(), term.to_lowercase()));
        }
        pairs
    }
}

/// Per-request context: resolved identity, credential, and timing.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Client identity used for rate-limit accounting.
    pub identity: String,

    /// Raw `Authorization` header value, if any.
    pub authorization: Option<String>,

    /// When the request entered the pipeline.
    pub received_at: Instant,
}

impl RequestContext {
    /// Build a context for one request.
    #[must_use]
    pub fn new(identity: impl Into<String>, authorization: Option<String>) -> Self {
        Self { identity: identity.into(), authorization, received_at: Instant::now() }
    }
}

/// Orchestrates the per-request stage chain.
///
/// Owns handles to the process-wide stores so tests can inject fresh ones.
pub struct RequestPipeline {
    config: Config,
    client: CountriesClient,
    cache: Arc<CacheStore>,
    limiter: Arc<RateLimiter>,
    auth: AuthGuard,
}

impl RequestPipeline {
    /// Wire a pipeline from explicit collaborators.
    #[must_use]
    pub fn new(
        config: Config,
        client: CountriesClient,
        cache: Arc<CacheStore>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let auth = AuthGuard::new(config.auth_token.clone());
        Self { config, client, cache, limiter, auth }
    }

    /// Build a pipeline with fresh stores from configuration alone.
    ///
    /// # Errors
    ///
    /// Returns error if the upstream client fails to initialize.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = CountriesClient::new(&config)?;
        let cache = Arc::new(CacheStore::new());
        let limiter =
            Arc::new(RateLimiter::new(config.rate_limit_window, config.rate_limit_max));
        Ok(Self::new(config, client, cache, limiter))
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Handle `GET /api/countries`: filtered, paginated listing.
    ///
    /// # Errors
    ///
    /// Returns a classified [`GatewayError`] on rejection or upstream failure.
    pub async fn list_countries(
        &self,
        ctx: &RequestContext,
        params: &ListParams,
    ) -> GatewayResult<Value> {
        self.check_rate(ctx)?;

        let key = CacheStore::fingerprint("GET", "/api/countries", &params.normalized_pairs());
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Serving listing from cache");
            return Ok(cached);
        }

        let raw = self.client.fetch_all().await?;
        let records: Vec<CountryRecord> = raw.iter().map(shape::format).collect();
        let page = shape::paginate(
            records,
            params.effective_page(),
            params.effective_limit(),
            params.search_term(),
        );

        let body = serde_json::to_value(page).map_err(|e| GatewayError::internal(e.to_string()))?;
        self.cache.put(&key, body.clone(), self.config.list_cache_ttl);
        tracing::debug!(elapsed = ?ctx.received_at.elapsed(), "Listing fetched and cached");
        Ok(body)
    }

    /// Handle `GET /api/countries/{name}`: single-country detail with
    /// optional field selection.
    ///
    /// Requires a bearer credential when a shared secret is configured.
    ///
    /// # Errors
    ///
    /// Returns a classified [`GatewayError`] on rejection, no match, or
    /// upstream failure.
    pub async fn country_detail(
        &self,
        ctx: &RequestContext,
        name: &str,
        fields_param: Option<&str>,
    ) -> GatewayResult<Value> {
        self.check_rate(ctx)?;
        self.check_auth(ctx)?;

        let requested: Vec<&str> = fields_param
            .map(|f| f.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let path = format!("/api/countries/{}", name.to_lowercase());
        let params: Vec<(String, String)> = if requested.is_empty() {
            vec![]
        } else {
            vec![("fields".to_string(), requested.join(","))]
        };
        let key = CacheStore::fingerprint("GET", &path, &params);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Serving detail from cache");
            return Ok(cached);
        }

        let countries = self.client.fetch_by_name(name).await?;
        let Some(raw) = countries.first() else {
            return Err(GatewayError::not_found(name));
        };
        let record = shape::format(raw);

        let body = if requested.is_empty() {
            serde_json::to_value(record).map_err(|e| GatewayError::internal(e.to_string()))?
        } else {
            Value::Object(shape::select_fields(&record, &requested))
        };

        self.cache.put(&key, body.clone(), self.config.detail_cache_ttl);
        tracing::debug!(elapsed = ?ctx.received_at.elapsed(), "Detail fetched and cached");
        Ok(body)
    }

    fn check_rate(&self, ctx: &RequestContext) -> GatewayResult<()> {
        match self.limiter.check(&ctx.identity) {
            RateDecision::Allowed => Ok(()),
            RateDecision::Limited { retry_after } => {
                tracing::warn!(identity = %ctx.identity, "Rate limit exceeded");
                Err(GatewayError::RateLimited { retry_after })
            }
        }
    }

    fn check_auth(&self, ctx: &RequestContext) -> GatewayResult<()> {
        if self.auth.validate(ctx.authorization.as_deref()) {
            Ok(())
        } else {
            Err(GatewayError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("auth_required", &self.auth.required())
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}
