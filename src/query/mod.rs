//! Query translation module
//!
//! Turns a free-form research request into a backend query string:
//! - Operator compiler: `site:`, `filetype:`, `AROUND(n)`, `intitle:` ...
//! - Request analyzer: ordered pattern rules that pull out entities and
//!   restriction directives
//! - Translator: fixed-precedence assembly of a compiled query, plus
//!   alternative variations
//! - Presets: canned operator suffixes for common search types

pub mod analyzer;
pub mod operators;
mod presets;
mod translator;

pub use analyzer::{analyze, RequestAnalysis, RestrictionSet};
pub use operators::ContentFocus;
pub use presets::SearchPreset;
pub use translator::Translator;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Operator category recorded in a query's breakdown
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCategory {
    Proximity,
    Entities,
    ContentFocus,
    UserRestrictions,
    SiteRestriction,
    ExcludeSites,
    Filetype,
    DateRestriction,
    DateBefore,
    ExcludeTerms,
    ExactPhrase,
    OrTerms,
}

impl OperatorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proximity => "proximity",
            Self::Entities => "entities",
            Self::ContentFocus => "content_focus",
            Self::UserRestrictions => "user_restrictions",
            Self::SiteRestriction => "site_restriction",
            Self::ExcludeSites => "exclude_sites",
            Self::Filetype => "filetype",
            Self::DateRestriction => "date_restriction",
            Self::DateBefore => "date_before",
            Self::ExcludeTerms => "exclude_terms",
            Self::ExactPhrase => "exact_phrase",
            Self::OrTerms => "or_terms",
        }
    }
}

/// Fragment(s) a category contributed
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Fragments {
    One(String),
    Many(Vec<String>),
}

/// Insertion-ordered record of which operators built a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorBreakdown {
    entries: Vec<(OperatorCategory, Fragments)>,
}

impl OperatorBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a category, replacing any earlier entry for it in place
    pub fn insert(&mut self, category: OperatorCategory, fragments: Fragments) {
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = fragments,
            None => self.entries.push((category, fragments)),
        }
    }

    pub fn remove(&mut self, category: OperatorCategory) {
        self.entries.retain(|(c, _)| *c != category);
    }

    pub fn get(&self, category: OperatorCategory) -> Option<&Fragments> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, f)| f)
    }

    /// Categories in the order they were applied
    pub fn categories(&self) -> Vec<OperatorCategory> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OperatorBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, fragments) in &self.entries {
            map.serialize_entry(category.as_str(), fragments)?;
        }
        map.end()
    }
}

/// A query ready for the backend, with how it was assembled
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Final operator-syntax query string
    #[serde(rename = "query")]
    pub text: String,
    /// Human-readable description of what the query is for
    pub purpose: String,
    pub operator_breakdown: OperatorBreakdown,
}
