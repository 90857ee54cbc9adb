//! HTTP request handlers

use super::state::AppState;
use crate::query::{CompiledQuery, SearchPreset};
use crate::quota::QuotaStatus;
use crate::search::{validate_query, SearchError, SearchResultItem};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

/// Sources searched by a research call when the caller does not say
const DEFAULT_MAX_SOURCES: u32 = 5;

/// Body for `/translate` and `/variations`
#[derive(Debug, Deserialize)]
pub struct TranslateParams {
    /// Natural-language research request
    pub request: String,
    /// Operator text appended verbatim, e.g. `site:example.com filetype:pdf`
    #[serde(default)]
    pub source_restrictions: Option<String>,
}

/// Body for `/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub max_results: Option<u32>,
    #[serde(default)]
    pub search_type: SearchPreset,
}

/// Body for `/research`
#[derive(Debug, Deserialize)]
pub struct ResearchParams {
    pub request: String,
    #[serde(default)]
    pub source_restrictions: Option<String>,
    pub max_sources: Option<u32>,
}

/// Body for `/extract`
#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    pub url: String,
}

/// What can be told about a URL without fetching it
#[derive(Debug, Serialize)]
pub struct UrlMetadata {
    pub url: String,
    /// Host with an explicit port, if any
    pub domain: String,
    pub path: String,
    pub timestamp: String,
    pub file_type: &'static str,
    pub message: String,
}

/// A compiled query together with what it was compiled from
#[derive(Debug, Serialize)]
pub struct TranslationRecord {
    #[serde(flatten)]
    pub compiled: CompiledQuery,
    pub original_request: String,
    pub restrictions_applied: Option<String>,
}

impl TranslationRecord {
    fn new(compiled: CompiledQuery, request: &str, restrictions: Option<&str>) -> Self {
        Self {
            compiled,
            original_request: request.to_string(),
            restrictions_applied: restrictions.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VariationsResponse {
    pub variations: Vec<CompiledQuery>,
    pub count: usize,
    pub original_request: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    /// Query after the search preset was applied
    pub enhanced_query: String,
    /// Query as sent to the backend
    pub converted_query: String,
    pub engine: String,
    pub api_status: QuotaStatus,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub query: String,
    pub translation: TranslationRecord,
    pub results: Vec<SearchResultItem>,
    pub sources_found: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: QuotaStatus,
    pub status_messages: Vec<String>,
}

/// A failed search, rendered with the quota state at the time of failure
#[derive(Debug)]
pub struct ApiError {
    pub error: SearchError,
    pub api_status: QuotaStatus,
}

impl ApiError {
    fn new(state: &AppState, error: SearchError) -> Self {
        Self {
            error,
            api_status: state.quota.status(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error {
            SearchError::Validation(_) => StatusCode::BAD_REQUEST,
            SearchError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            SearchError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            SearchError::Authorization { .. } | SearchError::Backend { .. } => {
                StatusCode::BAD_GATEWAY
            }
            SearchError::Network(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.error.to_string(),
            "kind": self.error.kind(),
            "api_status": self.api_status,
        }));
        (status, body).into_response()
    }
}

/// Blank restriction strings count as none
fn restrictions(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|r| !r.is_empty())
}

/// Translate a research request into a backend query
pub async fn translate(
    State(state): State<AppState>,
    Json(params): Json<TranslateParams>,
) -> Json<TranslationRecord> {
    info!("Translating research request: {}", params.request);
    let restrictions = restrictions(&params.source_restrictions);
    let compiled = state.translator.translate(&params.request, restrictions);
    Json(TranslationRecord::new(compiled, &params.request, restrictions))
}

/// Alternative phrasings of a research request
pub async fn variations(
    State(state): State<AppState>,
    Json(params): Json<TranslateParams>,
) -> Json<VariationsResponse> {
    info!("Creating query variations for: {}", params.request);
    let variations = state
        .translator
        .create_variations(&params.request, restrictions(&params.source_restrictions));

    Json(VariationsResponse {
        count: variations.len(),
        variations,
        original_request: params.request,
    })
}

/// Search with a free-text query and an optional preset
pub async fn search(
    State(state): State<AppState>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    info!(
        "Handling search: {} (type: {})",
        params.query, params.search_type
    );

    let enhanced_query = params.search_type.apply(&params.query);
    let converted_query =
        validate_query(&enhanced_query).map_err(|e| ApiError::new(&state, e))?;

    let results = state
        .search
        .search(&converted_query, params.max_results)
        .await
        .map_err(|e| {
            warn!("Search failed: {}", e);
            ApiError::new(&state, e)
        })?;

    Ok(Json(SearchResponse {
        results,
        enhanced_query,
        converted_query,
        engine: state.search.engine_name().to_string(),
        api_status: state.quota.status(),
    }))
}

/// Translate a request, then search with the compiled query
pub async fn research(
    State(state): State<AppState>,
    Json(params): Json<ResearchParams>,
) -> Result<Json<ResearchResponse>, ApiError> {
    info!("Performing research for: {}", params.request);

    let restrictions = restrictions(&params.source_restrictions);
    let compiled = state.translator.translate(&params.request, restrictions);
    let query = compiled.text.clone();
    info!("Translated query: {}", query);

    let max_sources = params.max_sources.unwrap_or(DEFAULT_MAX_SOURCES);
    let results = state
        .search
        .search(&query, Some(max_sources))
        .await
        .map_err(|e| {
            warn!("Research search failed: {}", e);
            ApiError::new(&state, e)
        })?;

    Ok(Json(ResearchResponse {
        query,
        translation: TranslationRecord::new(compiled, &params.request, restrictions),
        sources_found: results.len(),
        results,
    }))
}

/// Document kind guessed from the URL suffix
fn file_type(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if url.ends_with(".pdf") {
        "PDF document"
    } else if url.ends_with(".doc") || url.ends_with(".docx") {
        "Word document"
    } else if url.ends_with(".xls") || url.ends_with(".xlsx") {
        "Excel spreadsheet"
    } else {
        "Web page or other document"
    }
}

/// Basic metadata for a source URL
pub async fn extract(
    Json(params): Json<ExtractParams>,
) -> Result<Json<UrlMetadata>, (StatusCode, Json<serde_json::Value>)> {
    info!("Extracting metadata for: {}", params.url);
    let timestamp = chrono::Local::now().to_rfc3339();

    let parsed = Url::parse(&params.url).map_err(|e| {
        warn!("Metadata extraction failed for {}: {}", params.url, e);
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "url": params.url,
                "error": format!("Failed to extract metadata: {e}"),
                "timestamp": timestamp,
            })),
        )
    })?;

    let domain = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    Ok(Json(UrlMetadata {
        domain,
        path: parsed.path().to_string(),
        timestamp,
        file_type: file_type(&params.url),
        message: format!("Successfully retrieved metadata for {}", params.url),
        url: params.url,
    }))
}

/// Quota usage with a plain-language reading
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.quota.status();
    Json(StatusResponse {
        status_messages: status.messages(),
        status,
    })
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
