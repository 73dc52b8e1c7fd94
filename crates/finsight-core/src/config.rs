//! Advisor configuration
//!
//! Resolution order, later layers winning:
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, else ~/.local/share/finsight/config.toml if present)
//! 3. Environment variables (a `.env` file in the working directory is loaded first)
//!
//! Environment variables:
//! - `GROQ_API_KEY`: API key for the chat-completion service
//! - `FINSIGHT_BASE_URL`: OpenAI-compatible base URL (default: Groq)
//! - `FINSIGHT_MODEL`: default model id
//! - `FINSIGHT_PREVIEW_ROWS`: rows embedded in advisor prompts (default: 20)
//! - `FINSIGHT_TIMEOUT_SECS`: advisor request timeout (default: 60)
//! - `FINSIGHT_BACKEND`: `openai_compatible` (default) or `mock`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai::AdvisorModel;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
const BASE_URL_VAR: &str = "FINSIGHT_BASE_URL";
const MODEL_VAR: &str = "FINSIGHT_MODEL";
const PREVIEW_ROWS_VAR: &str = "FINSIGHT_PREVIEW_ROWS";
const TIMEOUT_VAR: &str = "FINSIGHT_TIMEOUT_SECS";
const BACKEND_VAR: &str = "FINSIGHT_BACKEND";

/// Which advisor backend to construct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    OpenaiCompatible,
    Mock,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai_compatible" | "openai" | "groq" => Some(Self::OpenaiCompatible),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Resolved advisor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: AdvisorModel,
    pub preview_rows: usize,
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: AdvisorModel::default(),
            preview_rows: crate::advisor::DEFAULT_PREVIEW_ROWS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AdvisorConfig {
    /// Load defaults, then the config file, then the environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(env_path) => debug!(path = %env_path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Failed to load .env"),
        }

        let mut config = Self::default();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };
        if let Some(file) = file {
            let content = fs::read_to_string(&file).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", file.display(), e))
            })?;
            config.apply_toml(&content)?;
            debug!(path = %file.display(), "Applied config file");
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply a TOML document on top of the current values
    pub fn apply_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(advisor) = raw.advisor {
            if let Some(backend) = advisor.backend {
                self.backend = backend;
            }
            if let Some(base_url) = advisor.base_url {
                self.base_url = base_url;
            }
            if let Some(api_key) = advisor.api_key.filter(|k| !k.trim().is_empty()) {
                self.api_key = Some(api_key);
            }
            if let Some(model) = advisor.model {
                self.model = model.parse()?;
            }
            if let Some(rows) = advisor.preview_rows {
                self.preview_rows = rows;
            }
            if let Some(secs) = advisor.timeout_secs {
                self.timeout = Duration::from_secs(secs);
            }
        }
        Ok(())
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_VAR) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(BASE_URL_VAR) {
            self.base_url = url;
        }
        if let Some(model) = get(MODEL_VAR) {
            self.model = model.parse()?;
        }
        if let Some(rows) = get(PREVIEW_ROWS_VAR) {
            self.preview_rows = rows.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number, got '{}'",
                    PREVIEW_ROWS_VAR, rows
                ))
            })?;
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number, got '{}'", TIMEOUT_VAR, secs))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(backend) = get(BACKEND_VAR) {
            self.backend = BackendKind::parse(&backend).ok_or_else(|| {
                Error::Config(format!(
                    "{} must be 'openai_compatible' or 'mock', got '{}'",
                    BACKEND_VAR, backend
                ))
            })?;
        }
        Ok(())
    }

    /// The API key, required by the real backend
    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty());
        match (self.backend, key) {
            (BackendKind::Mock, key) => Ok(key.unwrap_or_default()),
            (BackendKind::OpenaiCompatible, Some(key)) => Ok(key),
            (BackendKind::OpenaiCompatible, None) => Err(Error::Config(format!(
                "{} is not set; add it to the environment or a .env file",
                API_KEY_VAR
            ))),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    advisor: Option<RawAdvisor>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    backend: Option<BackendKind>,
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    preview_rows: Option<usize>,
    timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, AdvisorModel::Llama31Instant);
        assert_eq!(config.preview_rows, 20);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_apply_toml() {
        let mut config = AdvisorConfig::default();
        config
            .apply_toml(
                r#"
[advisor]
base_url = "http://localhost:8080/v1"
model = "llama-3.3-70b-versatile"
preview_rows = 5
timeout_secs = 10
"#,
            )
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, AdvisorModel::Llama33Versatile);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.backend, BackendKind::OpenaiCompatible);
    }

    #[test]
    fn test_apply_toml_rejects_unknown_model() {
        let mut config = AdvisorConfig::default();
        let err = config
            .apply_toml("[advisor]\nmodel = \"gpt-4\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(config.apply_toml("not toml [").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AdvisorConfig::default();
        config
            .apply_toml("[advisor]\npreview_rows = 5\napi_key = \"from-file\"\n")
            .unwrap();
        config
            .apply_env(env(&[
                ("GROQ_API_KEY", "from-env"),
                ("FINSIGHT_PREVIEW_ROWS", "8"),
                ("FINSIGHT_BACKEND", "mock"),
                ("FINSIGHT_MODEL", ""),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.preview_rows, 8);
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.model, AdvisorModel::default());
    }

    #[test]
    fn test_env_bad_values() {
        let mut config = AdvisorConfig::default();
        assert!(matches!(
            config.apply_env(env(&[("FINSIGHT_TIMEOUT_SECS", "soon")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.apply_env(env(&[("FINSIGHT_BACKEND", "ollama")])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_require_api_key() {
        let config = AdvisorConfig::default();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));

        let mock = AdvisorConfig {
            backend: BackendKind::Mock,
            ..AdvisorConfig::default()
        };
        assert_eq!(mock.require_api_key().unwrap(), "");

        let keyed = AdvisorConfig {
            api_key: Some("gsk_test".into()),
            ..AdvisorConfig::default()
        };
        assert_eq!(keyed.require_api_key().unwrap(), "gsk_test");

        let blank = AdvisorConfig {
            api_key: Some("  ".into()),
            ..AdvisorConfig::default()
        };
        assert!(matches!(blank.require_api_key(), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_toml_api_key_is_ignored() {
        let mut config = AdvisorConfig::default();
        config.apply_toml("[advisor]\napi_key = \"gsk_file\"\n").unwrap();
        config.apply_toml("[advisor]\napi_key = \"\"\n").unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk_file"));

        let mut fresh = AdvisorConfig::default();
        fresh.apply_toml("[advisor]\napi_key = \"   \"\n").unwrap();
        assert!(fresh.api_key.is_none());
        assert!(fresh.require_api_key().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[advisor]\nbase_url = \"http://127.0.0.1:9/v1\"\n").unwrap();

        let config = AdvisorConfig::load(Some(&path)).unwrap();
        if std::env::var(BASE_URL_VAR).is_err() {
            assert_eq!(config.base_url, "http://127.0.0.1:9/v1");
        }

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AdvisorConfig::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
