//! Paginated search execution

use super::error::{RateLimitOrigin, SearchError};
use super::models::SearchResultItem;
use crate::config::Settings;
use crate::engines::{Engine, Google, PageRequest};
use crate::network::Transport;
use crate::quota::QuotaTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Longest query the backend accepts
pub const MAX_QUERY_CHARS: usize = 2048;

/// Normalize a query for the backend: collapse whitespace runs and cap the
/// length. Empty queries are rejected.
pub fn validate_query(query: &str) -> Result<String, SearchError> {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(SearchError::Validation(
            "search query cannot be empty".to_string(),
        ));
    }

    if normalized.chars().count() > MAX_QUERY_CHARS {
        warn!("Query longer than {} characters, truncating", MAX_QUERY_CHARS);
        return Ok(normalized.chars().take(MAX_QUERY_CHARS).collect());
    }

    Ok(normalized)
}

/// Search client that turns one logical search into sequential page requests
/// against a single engine, drawing every page from a shared quota
pub struct SearchClient {
    engine: Arc<dyn Engine>,
    transport: Arc<dyn Transport>,
    quota: Arc<QuotaTracker>,
    settings: Settings,
    /// Budget for one whole paginated call
    timeout: Duration,
    /// Pause between consecutive pages
    page_delay: Duration,
}

impl SearchClient {
    /// Create a client for the configured Google backend
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>, quota: Arc<QuotaTracker>) -> Self {
        Self {
            engine: Arc::new(Google::new(&settings.google)),
            transport,
            quota,
            settings: settings.clone(),
            timeout: settings.search.timeout(),
            page_delay: settings.search.page_delay(),
        }
    }

    /// Replace the engine
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    /// Set the whole-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the inter-page delay
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    /// Results returned when the caller does not ask for a count
    pub fn default_max_results(&self) -> u32 {
        self.settings.search.max_results
    }

    /// Search starting at the first result
    pub async fn search(
        &self,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        self.search_from(query, max_results, 1).await
    }

    /// Search starting at a 1-based result index.
    ///
    /// Fails before any network traffic on missing credentials, an empty
    /// query or an exhausted quota. Afterwards the first backend failure is
    /// returned as is; nothing is retried.
    pub async fn search_from(
        &self,
        query: &str,
        max_results: Option<u32>,
        start_index: u32,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        self.settings.validate_credentials()?;
        let query = validate_query(query)?;
        let max_results = max_results.unwrap_or(self.settings.search.max_results);

        if !self.quota.can_proceed() {
            let reset_in = self.quota.time_until_reset();
            warn!("Search refused by local quota, resets in {}", reset_in);
            return Err(SearchError::RateLimitExceeded {
                origin: RateLimitOrigin::Local,
                reset_in: Some(reset_in),
            });
        }

        info!(
            "Searching {} for '{}' (max_results={}, start={})",
            self.engine.name(),
            query,
            max_results,
            start_index
        );

        let results = timeout(self.timeout, self.paginate(&query, max_results, start_index))
            .await
            .map_err(|_| {
                warn!("Search for '{}' timed out after {:?}", query, self.timeout);
                SearchError::Network(format!("search timed out after {:?}", self.timeout))
            })??;

        info!("Search returned {} results for '{}'", results.len(), query);
        Ok(results)
    }

    async fn paginate(
        &self,
        query: &str,
        max_results: u32,
        start_index: u32,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        let per_page = self.engine.results_per_page();
        let max_start = self.engine.max_start();

        let mut results: Vec<SearchResultItem> = Vec::new();
        let mut needed = max_results;
        let mut start = start_index.max(1);
        let mut first_page = true;

        while needed > 0 && start <= max_start {
            let num = needed.min(per_page);

            // A concurrent search may have taken the last slot since the precheck.
            if let Err(denied) = self.quota.try_acquire() {
                if first_page {
                    warn!("Search refused by local quota, resets in {}", denied.reset_in);
                    return Err(denied.into());
                }
                warn!(
                    "Quota exhausted mid-search, returning {} results",
                    results.len()
                );
                break;
            }
            first_page = false;

            debug!("Requesting page: num={}, start={}", num, start);
            let request = self.engine.request(&PageRequest { query, start, num });

            let response = self.transport.execute(request).await.map_err(|e| {
                warn!("Request to {} failed: {}", self.engine.name(), e);
                SearchError::from(e)
            })?;

            let items = self.engine.response(response).map_err(|e| {
                warn!("{} returned an error: {}", self.engine.name(), e);
                e
            })?;

            let mut returned = 0;
            for item in items.into_iter().take(num as usize) {
                let rank = results.len() as u32 + 1;
                results.push(SearchResultItem::from_engine(item, rank));
                returned += 1;
            }

            needed -= returned;
            start += returned;

            // A short page means the backend has nothing more
            if returned < num {
                debug!("Short page ({} of {}), stopping", returned, num);
                break;
            }

            if needed > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(results)
    }
}
