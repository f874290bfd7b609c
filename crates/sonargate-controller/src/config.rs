//! Controller configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration of the `sonargated` daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sonarqube: SonarQubeSettings,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sonarqube.base_url.is_empty() {
            return Err("sonarqube.base_url must be set".into());
        }
        if url::Url::parse(&self.sonarqube.base_url).is_err() {
            return Err(format!(
                "sonarqube.base_url is not a valid URL: {}",
                self.sonarqube.base_url
            ));
        }
        if self.sonarqube.request_timeout_ms == 0 {
            return Err("sonarqube.request_timeout_ms must be > 0".into());
        }
        if self.sonarqube.token.is_none()
            && self.sonarqube.token_env.is_none()
            && self.sonarqube.token_file.is_none()
        {
            return Err(
                "one of sonarqube.token, sonarqube.token_env, sonarqube.token_file must be set"
                    .into(),
            );
        }
        if self.controller.poll_interval_secs == 0 {
            return Err("controller.poll_interval_secs must be > 0".into());
        }
        let level = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&level.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }
}

/// Connection settings for the SonarQube instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarQubeSettings {
    /// Base URL of the instance, e.g. `https://sonar.example.com`.
    #[serde(default)]
    pub base_url: String,

    /// Personal access token, inline. Prefer `token_env` or `token_file`
    /// outside of local development.
    #[serde(default)]
    pub token: Option<String>,

    /// Name of an environment variable holding the token.
    #[serde(default)]
    pub token_env: Option<String>,

    /// Path of a file holding the token (a mounted secret).
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Skip TLS certificate verification for self-signed instances.
    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// Per-request deadline in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SonarQubeSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            token_env: None,
            token_file: None,
            insecure_skip_verify: false,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Reconciliation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// Seconds between reconcile sweeps.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Snapshot file keeping external identities across restarts.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Declarative manifest of desired gates and conditions.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            state_file: None,
            manifest: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
