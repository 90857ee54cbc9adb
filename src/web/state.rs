//! Application state shared across handlers

use crate::config::Settings;
use crate::network::Transport;
use crate::query::Translator;
use crate::quota::QuotaTracker;
use crate::search::SearchClient;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Request translator
    pub translator: Arc<Translator>,
    /// Paginated search client
    pub search: Arc<SearchClient>,
    /// The one quota tracker every search draws from
    pub quota: Arc<QuotaTracker>,
}

impl AppState {
    /// Create new application state around a transport
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        let quota = Arc::new(QuotaTracker::from_settings(&settings.rate_limits));
        let search = SearchClient::new(settings, transport, quota.clone());
        Self::with_search(settings, search)
    }

    /// Create state around an already configured search client
    pub fn with_search(settings: &Settings, search: SearchClient) -> Self {
        let translator = Translator::new().with_date_before(settings.search.include_date_before);
        let quota = search.quota().clone();

        Self {
            translator: Arc::new(translator),
            search: Arc::new(search),
            quota,
        }
    }
}
