//! querysmith: natural-language research requests compiled into search
//! operator queries, run against Google Custom Search under a shared quota.
//!
//! The translation half ([`query`]) is pure and works offline. The search
//! half ([`search`]) paginates against the backend through a [`network::Transport`],
//! drawing every page from one [`quota::QuotaTracker`].

pub mod config;
pub mod engines;
pub mod network;
pub mod query;
pub mod quota;
pub mod search;
pub mod web;

pub use config::Settings;
pub use engines::Engine;
pub use query::{CompiledQuery, Translator};
pub use quota::QuotaTracker;
pub use search::{SearchClient, SearchError, SearchResultItem};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
