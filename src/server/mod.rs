// HTTP endpoint adapter - validates the inbound `url`, delegates to the
// orchestrator, and turns every outcome into a JSON response
//
// Nothing escapes as a panic or a bare framework rejection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::lookup::extractors::{CliTitleExtractor, OEmbedTitleExtractor, PythonTitleExtractor};
use crate::lookup::{
    ExtractError, ExtractorKind, InvocationEnv, Invoker, TitleCache, TitleOrchestrator, UrlPolicy,
    ValidationError,
};

pub mod responses;

use responses::{outcome_response, validation_response};

/// Upper bound on a single backend availability check at startup
pub const EXTRACTOR_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TitleOrchestrator>,
    /// Backend availability, checked once when the state is built
    pub extractors: Arc<Vec<ExtractorStatus>>,
}

impl AppState {
    pub fn new(orchestrator: TitleOrchestrator, extractors: Vec<ExtractorStatus>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            extractors: Arc::new(extractors),
        }
    }

    /// Wire the real extractor backends from configuration and check which are usable
    pub async fn from_config(config: &AppConfig) -> Result<Self, ExtractError> {
        let max_len = config.max_diagnostic_len;
        let invoker = Invoker::new()
            .with_extractor(
                ExtractorKind::Cli,
                Arc::new(CliTitleExtractor::new(config.ytdlp_path.clone(), max_len)),
            )
            .with_extractor(
                ExtractorKind::Python,
                Arc::new(PythonTitleExtractor::new(
                    config.python_cmd.clone(),
                    max_len,
                )),
            )
            .with_extractor(
                ExtractorKind::Oembed,
                Arc::new(OEmbedTitleExtractor::new(
                    config.oembed_endpoint.clone(),
                    config.proxy.as_deref(),
                    max_len,
                )?),
            );

        let env = InvocationEnv {
            policy: UrlPolicy::new(&config.allowed_hosts),
            cookies_path: config.usable_cookies_path(),
            proxy: config.proxy.clone(),
        };

        let extractors = probe_extractors(&invoker, EXTRACTOR_PROBE_TIMEOUT).await;

        Ok(Self::new(
            TitleOrchestrator::new(
                config.strategies.clone(),
                invoker,
                Arc::new(TitleCache::new(config.cache_ttl())),
                env,
            ),
            extractors,
        ))
    }
}

/// Check every registered backend, each bounded by `timeout`.
///
/// A check that overruns counts as unavailable; its future is dropped, which
/// kills any command it started.
pub async fn probe_extractors(invoker: &Invoker, timeout: Duration) -> Vec<ExtractorStatus> {
    let mut statuses = Vec::new();
    for (kind, ext) in invoker.extractors() {
        let available = match tokio::time::timeout(timeout, ext.is_available()).await {
            Ok(available) => available,
            Err(_) => {
                warn!(
                    backend = %kind,
                    timeout_ms = timeout.as_millis() as u64,
                    "availability check timed out"
                );
                false
            }
        };
        statuses.push(ExtractorStatus {
            backend: kind.to_string(),
            name: ext.name(),
            available,
        });
    }
    statuses
}

pub fn build_router(state: AppState, lookup_path: &str) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route(lookup_path, get(lookup))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub url: Option<String>,
}

async fn lookup(
    State(state): State<AppState>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Response {
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;

    let url = match params {
        Ok(Query(LookupParams { url: Some(url) })) if !url.trim().is_empty() => url,
        Ok(_) => return validation_response(&ValidationError::MissingUrl, elapsed()),
        Err(rejection) => {
            debug!(error = %rejection, "unparseable query string");
            let err = ValidationError::InvalidUrl(rejection.body_text());
            return validation_response(&err, elapsed());
        }
    };

    if let Err(e) = state.orchestrator.env().policy.validate(&url) {
        return validation_response(&e, elapsed());
    }

    let outcome = state.orchestrator.fetch_title(&url).await;
    outcome_response(outcome, elapsed())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub strategies: Vec<String>,
    pub cache: CacheStatus,
    pub extractors: Vec<ExtractorStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub entries: usize,
    pub ttl_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractorStatus {
    pub backend: String,
    pub name: &'static str,
    pub available: bool,
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let orchestrator = &state.orchestrator;
    Json(StatusResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        strategies: orchestrator
            .strategy_names()
            .into_iter()
            .map(String::from)
            .collect(),
        cache: CacheStatus {
            entries: orchestrator.cache().len(),
            ttl_ms: orchestrator.cache().ttl().as_millis() as u64,
        },
        extractors: state.extractors.as_ref().clone(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
