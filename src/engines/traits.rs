//! Engine traits and types

use crate::search::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of a paginated search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    /// Compiled query text
    pub query: &'a str,
    /// 1-based index of the first result on the page
    pub start: u32,
    /// Number of results asked for
    pub num: u32,
}

/// Normalized result entry as returned by an engine, before ranking
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub domain: String,
    pub formatted_url: String,
}

/// HTTP request to be made for an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters, in the order they are sent
    pub params: Vec<(String, String)>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            params: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Look up a query parameter by name
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from an engine request
#[derive(Debug, Clone)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl EngineResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.text)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A paginated search backend.
///
/// Engines only build requests and interpret responses; sending them is the
/// transport's job, which keeps engines testable without a network.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Largest page the backend will return
    fn results_per_page(&self) -> u32 {
        10
    }

    /// Highest addressable start index
    fn max_start(&self) -> u32 {
        100
    }

    /// Build the HTTP request for one page
    fn request(&self, page: &PageRequest<'_>) -> EngineRequest;

    /// Parse the HTTP response into result items, or classify it as a failure
    fn response(&self, response: EngineResponse) -> Result<Vec<EngineItem>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_params_keep_order() {
        let req = EngineRequest::get("https://example.com/search")
            .param("q", "rust")
            .param("num", 10)
            .param("start", 1);

        let keys: Vec<_> = req.params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["q", "num", "start"]);
        assert_eq!(req.param_value("num"), Some("10"));
        assert_eq!(req.param_value("missing"), None);
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(EngineResponse::new(200, "{}").is_success());
        assert!(!EngineResponse::new(403, "").is_success());
        assert!(!EngineResponse::new(429, "").is_success());
    }
}
