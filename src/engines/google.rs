//! Google Custom Search JSON API engine

use super::traits::*;
use crate::config::GoogleSettings;
use crate::search::{RateLimitOrigin, SearchError};
use serde::Deserialize;
use tracing::warn;

/// Field selection sent with every request
const FIELDS: &str = "items(title,link,snippet,displayLink,formattedUrl)";

/// Longest slice of an unexpected response body kept in errors
const MAX_ERROR_BODY: usize = 200;

const DEFAULT_AUTH_MESSAGE: &str = "API key invalid or quota exceeded";

/// Google Custom Search engine
pub struct Google {
    base_url: String,
    api_key: String,
    cse_id: String,
    safe: String,
}

impl Google {
    pub fn new(settings: &GoogleSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            cse_id: settings.cse_id.clone(),
            safe: settings.safe.clone(),
        }
    }

    /// Map a failure status to an error, reading the message from the error
    /// envelope when there is one
    fn classify(status: u16, text: &str) -> SearchError {
        match status {
            429 => SearchError::RateLimitExceeded {
                origin: RateLimitOrigin::Backend,
                reset_in: None,
            },
            403 => {
                let message = serde_json::from_str::<ApiResponse>(text)
                    .ok()
                    .and_then(|r| r.error)
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| DEFAULT_AUTH_MESSAGE.to_string());
                SearchError::Authorization { message }
            }
            _ => SearchError::Backend {
                status,
                body: truncate(text, MAX_ERROR_BODY),
            },
        }
    }
}

impl Engine for Google {
    fn name(&self) -> &str {
        "google_custom_search"
    }

    fn request(&self, page: &PageRequest<'_>) -> EngineRequest {
        EngineRequest::get(&self.base_url)
            .header("Accept", "application/json")
            .param("q", page.query)
            .param("cx", &self.cse_id)
            .param("key", &self.api_key)
            .param("num", page.num)
            .param("start", page.start)
            .param("safe", &self.safe)
            .param("fields", FIELDS)
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<EngineItem>, SearchError> {
        if !response.is_success() {
            return Err(Self::classify(response.status, &response.text));
        }

        let data: ApiResponse = response.json().map_err(|e| {
            warn!("Unparseable response from {}: {}", self.name(), e);
            SearchError::Backend {
                status: response.status,
                body: truncate(&response.text, MAX_ERROR_BODY),
            }
        })?;

        // The API occasionally reports failures inside a 2xx body
        if let Some(error) = data.error {
            let status = error.code.unwrap_or(response.status);
            return Err(Self::classify(status, &response.text));
        }

        Ok(data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| EngineItem {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                domain: item.display_link,
                formatted_url: item.formatted_url,
            })
            .collect())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    items: Option<Vec<ApiItem>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiItem {
    title: String,
    link: String,
    snippet: String,
    display_link: String,
    formatted_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    message: Option<String>,
}
