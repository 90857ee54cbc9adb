//! Search engine module
//!
//! Defines the Engine trait and the Google Custom Search backend.

mod traits;

pub mod google;

pub use google::Google;
pub use traits::*;
