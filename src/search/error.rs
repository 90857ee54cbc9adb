//! Search failure taxonomy

use crate::config::ConfigError;
use crate::network::TransportError;
use crate::quota::QuotaDenied;
use serde::Serialize;
use thiserror::Error;

/// Where a rate-limit refusal came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitOrigin {
    /// Predicted by the local quota tracker before any request was sent
    Local,
    /// Signaled by the backend
    Backend,
}

/// Errors surfaced by a search call. None of them are retried internally.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{}", rate_limit_message(*origin, reset_in.as_deref()))]
    RateLimitExceeded {
        origin: RateLimitOrigin,
        reset_in: Option<String>,
    },

    #[error("API error: {message}")]
    Authorization { message: String },

    #[error("API request failed with status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid query: {0}")]
    Validation(String),
}

impl SearchError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::Authorization { .. } => "authorization_error",
            Self::Backend { .. } => "backend_error",
            Self::Network(_) => "network_error",
            Self::Validation(_) => "validation_error",
        }
    }
}

impl From<QuotaDenied> for SearchError {
    fn from(denied: QuotaDenied) -> Self {
        Self::RateLimitExceeded {
            origin: RateLimitOrigin::Local,
            reset_in: Some(denied.reset_in),
        }
    }
}

impl From<TransportError> for SearchError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.to_string())
    }
}

fn rate_limit_message(origin: RateLimitOrigin, reset_in: Option<&str>) -> String {
    match (origin, reset_in) {
        (RateLimitOrigin::Backend, _) => "Rate limit exceeded by the search backend".to_string(),
        (RateLimitOrigin::Local, Some(reset)) => {
            format!("Rate limit exceeded. Try again in {}", reset)
        }
        (RateLimitOrigin::Local, None) => "Rate limit exceeded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_denial_message() {
        let err = SearchError::from(QuotaDenied {
            reset_in: "42s".to_string(),
        });
        assert_eq!(err.kind(), "rate_limit_exceeded");
        assert_eq!(err.to_string(), "Rate limit exceeded. Try again in 42s");
    }

    #[test]
    fn test_transport_error_is_network() {
        let err = SearchError::from(TransportError::Timeout);
        assert_eq!(err.kind(), "network_error");
        assert_eq!(err.to_string(), "network error: request timed out");
    }

    #[test]
    fn test_config_error_is_configuration() {
        let err = SearchError::from(ConfigError::MissingCredential("google.api_key"));
        assert_eq!(err.kind(), "configuration_error");
        assert!(err.to_string().contains("google.api_key"));
    }
}
