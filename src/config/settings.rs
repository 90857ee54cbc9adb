//! Settings structures for querysmith configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Prefix that marks a credential copied verbatim from a sample file
const PLACEHOLDER_PREFIX: &str = "your-";

/// Configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("{0} still holds a placeholder value")]
    PlaceholderCredential(&'static str),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main settings structure, deserialized from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub google: GoogleSettings,
    pub rate_limits: RateLimitSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Merge with environment variables (QUERYSMITH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("QUERYSMITH_GOOGLE_API_KEY") {
            self.google.api_key = val;
        }
        if let Some(val) = var("QUERYSMITH_GOOGLE_CSE_ID") {
            self.google.cse_id = val;
        }
        if let Some(val) = var("QUERYSMITH_DEBUG") {
            self.server.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("QUERYSMITH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("QUERYSMITH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Check that backend credentials are present and not placeholders
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        check_credential("google.api_key", &self.google.api_key)?;
        check_credential("google.cse_id", &self.google.cse_id)
    }

    /// Check the non-credential settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limits.max_requests_per_day == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limits.max_requests_per_day",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.rate_limits.max_requests_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limits.max_requests_per_minute",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.search.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "search.timeout_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        url::Url::parse(&self.google.base_url).map_err(|e| ConfigError::Invalid {
            field: "google.base_url",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn check_credential(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::MissingCredential(name))
    } else if value.starts_with(PLACEHOLDER_PREFIX) {
        Err(ConfigError::PlaceholderCredential(name))
    } else {
        Ok(())
    }
}

/// Google Custom Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// API key
    pub api_key: String,
    /// Custom search engine id (`cx`)
    pub cse_id: String,
    /// Endpoint URL
    pub base_url: String,
    /// Safe search level passed through to the backend
    pub safe: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cse_id: String::new(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            safe: "medium".to_string(),
        }
    }
}

/// Request ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_requests_per_day: u32,
    pub max_requests_per_minute: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests_per_day: 100,
            max_requests_per_minute: 10,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results returned when a caller does not ask for a count
    pub max_results: u32,
    /// Budget for one whole paginated search (seconds)
    pub timeout_seconds: u64,
    /// Pause between consecutive page requests (milliseconds)
    pub page_delay_ms: u64,
    /// Append parsed `before:` dates to compiled queries
    pub include_date_before: bool,
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_seconds: 30,
            page_delay_ms: 100,
            include_date_before: false,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Verbose logging
    pub debug: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> Settings {
        let mut settings = Settings::default();
        settings.google.api_key = "AIzaSyExample".to_string();
        settings.google.cse_id = "0123456789:abc".to_string();
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.rate_limits.max_requests_per_day, 100);
        assert_eq!(settings.rate_limits.max_requests_per_minute, 10);
        assert_eq!(settings.search.timeout(), Duration::from_secs(30));
        assert!(!settings.search.include_date_before);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
google:
  api_key: abc
  cse_id: def
rate_limits:
  max_requests_per_minute: 3
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.google.api_key, "abc");
        assert_eq!(settings.google.safe, "medium");
        assert_eq!(settings.rate_limits.max_requests_per_minute, 3);
        assert_eq!(settings.rate_limits.max_requests_per_day, 100);
        assert_eq!(settings.search.page_delay_ms, 100);
    }

    #[test]
    fn test_missing_credentials() {
        let err = Settings::default().validate_credentials().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("google.api_key")));

        let mut settings = configured();
        settings.google.cse_id = "  ".to_string();
        let err = settings.validate_credentials().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("google.cse_id")));
    }

    #[test]
    fn test_placeholder_credentials() {
        let mut settings = configured();
        settings.google.api_key = "your-google-api-key".to_string();
        let err = settings.validate_credentials().unwrap_err();
        assert!(matches!(err, ConfigError::PlaceholderCredential(_)));
        assert!(configured().validate_credentials().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = configured();
        settings.rate_limits.max_requests_per_minute = 0;
        assert!(settings.validate().is_err());

        let mut settings = configured();
        settings.google.base_url = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "google.base_url", .. }));
    }

    #[test]
    fn test_merge_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QUERYSMITH_GOOGLE_API_KEY", "env-key"),
            ("QUERYSMITH_PORT", "9100"),
            ("QUERYSMITH_DEBUG", "true"),
            ("QUERYSMITH_BIND_ADDRESS", "0.0.0.0"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.google.api_key, "env-key");
        assert_eq!(settings.server.port, 9100);
        assert!(settings.server.debug);
        assert_eq!(settings.server.bind_address, "0.0.0.0");
        assert!(settings.google.cse_id.is_empty());
    }

    #[test]
    fn test_merge_env_ignores_bad_port() {
        let mut settings = Settings::default();
        settings.merge_vars(|k| (k == "QUERYSMITH_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(settings.server.port, 8000);
    }
}
