//! Configuration module for querysmith
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "QUERYSMITH_SETTINGS_PATH";

/// Default settings file locations, in lookup order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("querysmith/settings.yml"));
    }
    paths
}

/// Load settings from an explicit path, the settings path variable, or the
/// first default location that exists, then merge environment overrides.
/// Falls back to defaults when no file is found.
pub fn load(explicit: Option<PathBuf>) -> Result<Settings, ConfigError> {
    let candidates = explicit
        .into_iter()
        .chain(std::env::var(SETTINGS_PATH_VAR).ok().map(PathBuf::from))
        .chain(default_paths());

    let mut settings = None;
    for path in candidates {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            settings = Some(Settings::from_file(&path)?);
            break;
        }
    }

    let mut settings = settings.unwrap_or_else(|| {
        info!("No settings file found, using defaults");
        Settings::default()
    });
    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("querysmith-{}.yml", std::process::id()));
        std::fs::write(&path, "search:\n  max_results: 25\n").unwrap();

        let settings = load(Some(path.clone())).unwrap();
        assert_eq!(settings.search.max_results, 25);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!("querysmith-bad-{}.yml", std::process::id()));
        std::fs::write(&path, "search: [unclosed\n").unwrap();

        let err = load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_example_settings_need_real_credentials() {
        let settings = Settings::from_file("settings.example.yml").unwrap();
        assert!(settings.validate().is_ok());
        assert!(matches!(
            settings.validate_credentials(),
            Err(ConfigError::PlaceholderCredential("google.api_key"))
        ));
    }
}
