//! Web server module
//!
//! Exposes translation, search and quota status as a JSON API.

mod handlers;
mod routes;
mod state;

pub use handlers::ApiError;
pub use routes::create_router;
pub use state::AppState;
