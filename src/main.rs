//! querysmith: research query translation and search service
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::Parser;
use querysmith::{
    config,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Compile research requests into search operator queries
///
/// Settings can also come from QUERYSMITH_SETTINGS_PATH and the
/// QUERYSMITH_* overrides; RUST_LOG overrides the debug flag.
#[derive(Parser, Debug)]
#[command(name = "querysmith", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; the level is revisited once settings are loaded
    let (filter, filter_handle) = reload::Layer::new(log_filter(false));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = config::load(args.config).context("failed to load settings")?;
    if settings.server.debug {
        filter_handle.reload(log_filter(true))?;
    }

    info!("Starting querysmith v{}", querysmith::VERSION);

    if let Err(e) = settings.validate_credentials() {
        warn!("{}; searches will fail until credentials are set", e);
    }

    // Initialize HTTP client
    let client = HttpClient::new(settings.search.timeout())?;
    info!("HTTP client initialized");

    let addr = SocketAddr::new(
        settings
            .server
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind address {}", settings.server.bind_address))?,
        settings.server.port,
    );

    info!(
        "Quota: {} requests/day, {} requests/minute",
        settings.rate_limits.max_requests_per_day, settings.rate_limits.max_requests_per_minute
    );

    // Create application state
    let state = AppState::new(&settings, Arc::new(client));
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins; otherwise info, or debug when the debug flag is set
fn log_filter(debug: bool) -> EnvFilter {
    let default_level = if debug {
        "querysmith=debug,tower_http=debug"
    } else {
        "querysmith=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        let args = Args::try_parse_from(["querysmith", "-c", "custom.yml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.yml")));

        let args = Args::try_parse_from(["querysmith", "--config", "a/b.yml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("a/b.yml")));

        assert!(Args::try_parse_from(["querysmith"]).unwrap().config.is_none());
        assert!(Args::try_parse_from(["querysmith", "--bogus"]).is_err());
    }
}
