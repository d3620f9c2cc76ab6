// crates/client/src/config.rs
//! Console configuration: API endpoint and polling cadence.
//!
//! Resolution order for the file: explicit path, `QUIZFORGE_CONFIG`, then
//! `<config dir>/quizforge/quizforge.toml`. Only the last one may be missing.
//! Environment variables override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use quizforge_jobs::PollConfig;

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "QUIZFORGE_CONFIG";
pub const API_URL_ENV: &str = "QUIZFORGE_API_URL";
pub const API_TOKEN_ENV: &str = "QUIZFORGE_API_TOKEN";
pub const POLL_INTERVAL_ENV: &str = "QUIZFORGE_POLL_INTERVAL_SECS";

/// Connection settings for the console's REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Per-request timeout; the build subsystem has no overall job timeout.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".into(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Everything `quizforge.toml` can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub polling: PollConfig,
}

impl ConsoleConfig {
    /// Platform default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quizforge").join("quizforge.toml"))
    }

    /// Load from file and process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));

        let mut config = match required {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `QUIZFORGE_*` overrides.
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(API_URL_ENV) {
            self.api.base_url = url;
        }
        if let Some(token) = env(API_TOKEN_ENV) {
            self.api.token = Some(token);
        }
        if let Some(raw) = env(POLL_INTERVAL_ENV) {
            self.polling.interval_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: POLL_INTERVAL_ENV.into(),
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api.base_url".into(),
                value: self.api.base_url.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[api]
base_url = "https://console.example.com/api"
token = "secret"
timeout_secs = 10

[polling]
interval_secs = 5
"#
        )
        .unwrap();

        let config = ConsoleConfig::load_with(Some(file.path()), env_from(&[])).unwrap();
        assert_eq!(config.api.base_url, "https://console.example.com/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.polling.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[polling]\ninterval_secs = 12\n").unwrap();

        let config = ConsoleConfig::load_with(Some(file.path()), env_from(&[])).unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.polling.interval_secs, 12);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[api]\nbase_url = \"http://a.example\"\n").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ConsoleConfig::load_with(
            None,
            env_from(&[
                (CONFIG_ENV, path.as_str()),
                (API_URL_ENV, "https://b.example/api"),
                (API_TOKEN_ENV, "tok"),
                (POLL_INTERVAL_ENV, " 45 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://b.example/api");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        assert_eq!(config.polling.interval_secs, 45);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConsoleConfig::load_with(Some(missing.as_path()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = ConsoleConfig::default();
        let err = config
            .apply_env(env_from(&[(POLL_INTERVAL_ENV, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(POLL_INTERVAL_ENV));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[api]\nbase_url = \"console.example.com\"\n").unwrap();
        let err = ConsoleConfig::load_with(Some(file.path()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[api\n").unwrap();
        let err = ConsoleConfig::load_with(Some(file.path()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
