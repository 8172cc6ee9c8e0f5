use std::time::Duration;

use phasesync_http::{AuthHeader, ClientSettings};
use serde::{Deserialize, Serialize};

const MASK: &str = "********";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.api.timeout_ms == 0 {
            return Err("api.timeout_ms must be > 0".into());
        }
        if let Some(base_url) = self.api.base_url.as_deref() {
            url::Url::parse(base_url)
                .map_err(|e| format!("api.base_url is not a valid URL: {e}"))?;
        }
        if self.api.username.is_some() != self.api.password.is_some() {
            return Err("api.username and api.password must be set together".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self
            .reconcile
            .project_scope
            .as_deref()
            .is_some_and(|scope| scope.trim().is_empty())
        {
            return Err("reconcile.project_scope must not be blank when set".into());
        }
        Ok(())
    }

    /// Copy safe to print: token and password replaced.
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        if copy.api.token.is_some() {
            copy.api.token = Some(MASK.into());
        }
        if copy.api.password.is_some() {
            copy.api.password = Some(MASK.into());
        }
        copy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Bearer token; takes precedence over basic credentials.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            token: None,
            username: None,
            password: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn auth(&self) -> Option<AuthHeader> {
        if let Some(token) = &self.token {
            return Some(AuthHeader::Bearer {
                token: token.clone(),
            });
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(AuthHeader::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Client settings for `base_url`, carrying timeout and credentials.
    pub fn client_settings(&self, base_url: impl Into<String>) -> ClientSettings {
        let settings = ClientSettings::new(base_url).with_timeout(self.timeout());
        match self.auth() {
            Some(auth) => settings.with_auth(auth),
            None => settings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Project that phases are looked up in and created under.
    #[serde(default)]
    pub project_scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "phasesync.toml";

    /// Loads `path` (or `phasesync.toml` when present), then applies
    /// `PHASESYNC__SECTION__KEY` environment overrides, then validates.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // e.g. PHASESYNC__API__TIMEOUT_MS=5000
        builder = builder.add_source(
            Environment::with_prefix("PHASESYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.timeout_ms, 30_000);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut cfg = AppConfig::default();
        cfg.api.timeout_ms = 0;
        assert!(cfg.validate().unwrap_err().contains("timeout_ms"));

        let mut cfg = AppConfig::default();
        cfg.api.base_url = Some("not a url".into());
        assert!(cfg.validate().unwrap_err().contains("base_url"));

        let mut cfg = AppConfig::default();
        cfg.api.username = Some("lead".into());
        assert!(cfg.validate().unwrap_err().contains("together"));

        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().unwrap_err().contains("logging.level"));

        let mut cfg = AppConfig::default();
        cfg.reconcile.project_scope = Some("  ".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_token_wins_over_basic() {
        let api = ApiConfig {
            token: Some("t".into()),
            username: Some("u".into()),
            password: Some("p".into()),
            ..Default::default()
        };
        assert!(matches!(api.auth(), Some(AuthHeader::Bearer { .. })));

        let api = ApiConfig {
            username: Some("u".into()),
            password: Some("p".into()),
            ..Default::default()
        };
        assert!(matches!(api.auth(), Some(AuthHeader::Basic { .. })));
        assert!(ApiConfig::default().auth().is_none());
    }

    #[test]
    fn test_masked_hides_secrets_only() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = Some("http://tracker.local".into());
        cfg.api.token = Some("secret-token".into());
        let masked = cfg.masked();
        assert_eq!(masked.api.token.as_deref(), Some(MASK));
        assert_eq!(masked.api.password, None);
        assert_eq!(masked.api.base_url, cfg.api.base_url);
    }
}
