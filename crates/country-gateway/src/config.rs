//! Configuration for the country gateway.

use std::time::Duration;

/// Upstream and gateway defaults.
pub mod api {
    use std::time::Duration;

    /// Base URL for the REST Countries provider.
    pub const UPSTREAM_URL: &str = "https://restcountries.com/v3.1";

    /// Request timeout for upstream calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Cache TTL for the listing endpoint (5 minutes).
    pub const LIST_CACHE_TTL: Duration = Duration::from_secs(300);

    /// Cache TTL for the detail endpoint (10 minutes).
    pub const DETAIL_CACHE_TTL: Duration = Duration::from_secs(600);

    /// Rate-limit window (15 minutes).
    pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(900);

    /// Maximum requests per identity per window.
    pub const RATE_LIMIT_MAX: u32 = 100;

    /// Default page number.
    pub const DEFAULT_PAGE: usize = 1;

    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 20;

    /// Default listening port.
    pub const DEFAULT_PORT: u16 = 8000;
}

/// Field schemas for upstream requests and response shaping.
pub mod fields {
    /// Fields requested from the provider on the fetch-all path.
    ///
    /// The provider rejects `/all` without an explicit field list.
    pub const UPSTREAM: &[&str] = &[
        "name",
        "cca2",
        "cca3",
        "flags",
        "population",
        "region",
        "subregion",
        "capital",
        "languages",
        "currencies",
        "maps",
        "timezones",
        "latlng",
    ];

    /// Top-level fields of the canonical record that clients may select
    /// with the `fields` query parameter. Anything else is silently dropped.
    pub const SELECTABLE: &[&str] = &[
        "name",
        "officialName",
        "code",
        "cca3",
        "flagUrl",
        "population",
        "region",
        "subregion",
        "capital",
        "languages",
        "currencies",
        "maps",
        "timezones",
        "coordinates",
    ];

    /// Check whether a field name is part of the selectable schema.
    #[must_use]
    pub fn is_selectable(name: &str) -> bool {
        SELECTABLE.contains(&name)
    }
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening port.
    pub port: u16,

    /// Environment mode ("development" or "production"); affects error verbosity.
    pub environment: String,

    /// Allowed CORS origins; `["*"]` means any origin.
    pub allowed_origins: Vec<String>,

    /// Shared bearer secret for the detail endpoint (optional).
    pub auth_token: Option<String>,

    /// Base URL for the upstream provider (overridable for mock servers).
    pub upstream_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Cache TTL for the listing endpoint.
    pub list_cache_ttl: Duration,

    /// Cache TTL for the detail endpoint.
    pub detail_cache_ttl: Duration,

    /// Rate-limit window duration.
    pub rate_limit_window: Duration,

    /// Maximum requests per identity per window.
    pub rate_limit_max: u32,
}

impl Config {
    /// Create a new configuration with an optional bearer secret.
    ///
    /// With a secret configured the detail endpoint requires authentication;
    /// without one it is open.
    #[must_use]
    pub fn new(auth_token: Option<String>) -> Self {
        Self {
            port: api::DEFAULT_PORT,
            environment: "development".to_string(),
            allowed_origins: vec!["*".to_string()],
            auth_token,
            upstream_url: api::UPSTREAM_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            list_cache_ttl: api::LIST_CACHE_TTL,
            detail_cache_ttl: api::DETAIL_CACHE_TTL,
            rate_limit_window: api::RATE_LIMIT_WINDOW,
            rate_limit_max: api::RATE_LIMIT_MAX,
        }
    }

    /// Create a test configuration pointed at a mock upstream.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            port: 0,
            environment: "development".to_string(),
            allowed_origins: vec!["*".to_string()],
            auth_token: None,
            upstream_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            list_cache_ttl: api::LIST_CACHE_TTL,
            detail_cache_ttl: api::DETAIL_CACHE_TTL,
            rate_limit_window: api::RATE_LIMIT_WINDOW,
            rate_limit_max: 10_000, // Effectively unlimited in tests
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("API_AUTH_TOKEN").ok());

        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse()?;
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            config.environment = env;
        }
        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins =
                origins.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect();
        }
        if let Ok(url) = std::env::var("UPSTREAM_URL") {
            config.upstream_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = std::env::var("LIST_CACHE_TTL_SECS") {
            config.list_cache_ttl = Duration::from_secs(secs.parse()?);
        }
        if let Ok(secs) = std::env::var("DETAIL_CACHE_TTL_SECS") {
            config.detail_cache_ttl = Duration::from_secs(secs.parse()?);
        }
        if let Ok(secs) = std::env::var("RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit_window = Duration::from_secs(secs.parse()?);
        }
        if let Ok(max) = std::env::var("RATE_LIMIT_MAX") {
            config.rate_limit_max = max.parse()?;
        }

        Ok(config)
    }

    /// Check if a bearer secret is configured.
    #[must_use]
    pub const fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Whether the gateway runs in a development-like mode.
    ///
    /// Error responses include upstream detail only in this mode.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment != "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
