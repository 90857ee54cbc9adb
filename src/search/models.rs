//! Search result types

use crate::engines::EngineItem;
use serde::{Deserialize, Serialize};

/// One normalized, ranked search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Display domain, e.g. `www.nasa.gov`
    pub domain: String,
    pub formatted_url: String,
    /// 1-based position within one search call
    pub rank: u32,
}

impl SearchResultItem {
    pub fn from_engine(item: EngineItem, rank: u32) -> Self {
        Self {
            title: item.title,
            url: item.url,
            snippet: item.snippet,
            domain: item.domain,
            formatted_url: item.formatted_url,
            rank,
        }
    }
}
