//! Search presets that widen or narrow a free-text query with fixed operators

use serde::{Deserialize, Serialize};

/// Kind of search to run a free-text query as
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchPreset {
    Academic,
    News,
    Technical,
    Osint,
    #[default]
    #[serde(other)]
    General,
}

impl SearchPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Academic => "academic",
            Self::News => "news",
            Self::Technical => "technical",
            Self::Osint => "osint",
        }
    }

    /// Operators appended to the query for this preset
    pub fn operators(&self) -> Option<&'static str> {
        match self {
            Self::General => None,
            Self::Academic => Some(
                "site:scholar.google.com OR site:arxiv.org OR site:researchgate.net OR filetype:pdf",
            ),
            Self::News => Some("site:reuters.com OR site:bbc.com OR site:ap.org OR site:npr.org"),
            Self::Technical => Some(
                "site:stackoverflow.com OR site:github.com OR site:docs.python.org OR site:developer.mozilla.org",
            ),
            Self::Osint => Some("-site:facebook.com -site:twitter.com -site:instagram.com"),
        }
    }

    /// Apply the preset to a query
    pub fn apply(&self, query: &str) -> String {
        match self.operators() {
            Some(ops) => format!("{} {}", query, ops),
            None => query.to_string(),
        }
    }
}

impl std::fmt::Display for SearchPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
