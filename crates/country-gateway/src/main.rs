//! Country Gateway - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use country_gateway::{config::Config, pipeline::RequestPipeline, server};

#[derive(Parser, Debug)]
#[command(name = "country-gateway")]
#[command(about = "Caching, rate-limiting gateway for the REST Countries API")]
#[command(version)]
struct Cli {
    /// Listening port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Environment mode (development or production)
    #[arg(long, default_value = "development", env = "APP_ENV")]
    environment: String,

    /// Shared bearer secret for the detail endpoint (unset leaves it open)
    #[arg(long, env = "API_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    config.port = cli.port;
    config.environment = cli.environment;
    if cli.auth_token.is_some() {
        config.auth_token = cli.auth_token;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        environment = %config.environment,
        auth_required = config.has_auth_token(),
        upstream = %config.upstream_url,
        "Starting country gateway"
    );

    let pipeline = RequestPipeline::from_config(config)?;
    server::run(pipeline).await
}
