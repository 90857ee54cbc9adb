//! Search orchestration module
//!
//! Runs paginated searches against the backend engine, drawing on the shared
//! request quota, and defines the error kinds a search can fail with.

mod error;
mod executor;
mod models;

pub use error::{RateLimitOrigin, SearchError};
pub use executor::{validate_query, SearchClient, MAX_QUERY_CHARS};
pub use models::*;
