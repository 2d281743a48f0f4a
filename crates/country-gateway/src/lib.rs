//! Country Gateway
//!
//! A backend gateway in front of the REST Countries API. Shields the provider
//! from redundant traffic and presents a smaller, cleaner contract to clients.
//!
//! # Features
//!
//! - **Cached**: TTL-based response cache keyed on request fingerprints
//! - **Rate-limited**: fixed-window accounting per client identity
//! - **Resilient**: full-text upstream lookup with a single substring fallback
//! - **Shaped**: field filtering and pagination over a canonical record
//!
//! # Example
//!
//! ```no_run
//! use country_gateway::{config::Config, pipeline::RequestPipeline, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = RequestPipeline::from_config(config)?;
//!     server::run(pipeline).await
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod server;
pub mod shape;

pub use client::CountriesClient;
pub use config::Config;
pub use error::{GatewayError, UpstreamError};
pub use pipeline::RequestPipeline;
