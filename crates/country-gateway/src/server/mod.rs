//! HTTP server wiring: routes, CORS, request logging, error rendering.
//!
//! Handlers stay thin; all request semantics live in the pipeline. The route
//! table is the gateway's whole public contract:
//!
//! - `GET /api/countries`: paginated, searchable listing
//! - `GET /api/countries/{name}`: detail with optional field selection
//! - `GET /api/health`: liveness probe
//! - anything else: structured 404

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::GatewayError;
use crate::pipeline::{ListParams, RequestContext, RequestPipeline};

/// Shared state for HTTP handlers.
pub struct AppState {
    /// The request pipeline.
    pub pipeline: RequestPipeline,

    /// Process start, for the health endpoint's uptime.
    pub started_at: Instant,
}

/// Query parameters for the detail endpoint.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// Comma-separated list of top-level fields to keep.
    #[serde(default)]
    fields: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(pipeline: RequestPipeline) -> Router {
    let cors = cors_layer(pipeline.config());
    let state = Arc::new(AppState { pipeline, started_at: Instant::now() });

    Router::new()
        .route("/api/countries", get(list_countries))
        .route("/api/countries/{name}", get(country_detail))
        .route("/api/health", get(health_check))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
///
/// # Errors
///
/// Returns error on bind or server failure.
pub async fn run(pipeline: RequestPipeline) -> anyhow::Result<()> {
    let port = pipeline.config().port;
    let router = create_router(pipeline);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Gateway shut down");
    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> =
            config.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    }
}

async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Response {
    let ctx = request_context(&headers);
    match state.pipeline.list_countries(&ctx, &params).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => render_error(&state, &err),
    }
}

async fn country_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<DetailQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = request_context(&headers);
    match state.pipeline.country_detail(&ctx, &name, query.fields.as_deref()).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => render_error(&state, &err),
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs(),
        "environment": state.pipeline.config().environment,
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "availableEndpoints": [
                "GET /api/countries",
                "GET /api/countries/:name",
                "GET /api/health",
            ],
        })),
    )
}

/// Resolve the client identity and credential for one request.
///
/// Identity is the first `X-Forwarded-For` hop when present; a fixed local
/// identity otherwise.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let identity = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("local")
        .to_string();

    let authorization =
        headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(String::from);

    RequestContext::new(identity, authorization)
}

/// Render a classified error, with a Retry-After header on 429s.
fn render_error(state: &AppState, err: &GatewayError) -> Response {
    match err {
        GatewayError::Internal { message } => {
            tracing::error!(error = %message, "Internal error");
        }
        other => {
            tracing::debug!(error = %other, "Request rejected");
        }
    }

    let (status, body) = err.to_response(state.pipeline.config().is_development());
    let mut response = (status, Json(body)).into_response();

    if let Some(retry_after) = err.retry_after() {
        if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }

    response
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
