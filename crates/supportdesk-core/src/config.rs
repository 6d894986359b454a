use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::provider::Provider;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TYPEWRITER_DELAY_MS: u64 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub typewriter_delay_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::default().as_str().to_string()),
            ..Self::default()
        }
    }

    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("supportdesk").join("config.json"))
    }

    /// Configured provider; unknown names fall back to the default with a warning.
    pub fn provider(&self) -> Provider {
        match self.provider.as_deref() {
            None => Provider::default(),
            Some(name) => Provider::from_str(name).unwrap_or_else(|| {
                tracing::warn!(
                    provider = name,
                    known = %Provider::known_names(),
                    "unknown provider in config, using default"
                );
                Provider::default()
            }),
        }
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    /// API key for `provider`: environment first, then the config file.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        self.api_key_with(provider, |var| std::env::var(var).ok())
    }

    fn api_key_with(&self, provider: Provider, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        let from_env = provider
            .api_key_var()
            .and_then(|var| env(var))
            .filter(|key| !key.is_empty());

        from_env.or_else(|| match provider {
            Provider::Gemini => self.gemini_api_key.clone(),
            Provider::Claude => self.claude_api_key.clone(),
            Provider::OpenAI => self.openai_api_key.clone(),
            Provider::Ollama => None,
        })
    }

    /// Ollama base URL: `OLLAMA_HOST`, then the config file, then the default.
    /// A bare `host:port` gets an `http://` scheme.
    pub fn ollama_url(&self) -> String {
        self.ollama_url_with(std::env::var("OLLAMA_HOST").ok())
    }

    fn ollama_url_with(&self, env_host: Option<String>) -> String {
        let url = env_host
            .filter(|host| !host.trim().is_empty())
            .or_else(|| self.ollama_url.clone())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let url = url.trim();

        if url.contains("://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        }
    }

    pub fn typewriter_delay(&self) -> Duration {
        Duration::from_millis(self.typewriter_delay_ms.unwrap_or(DEFAULT_TYPEWRITER_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.model(), "gemini-2.5-flash");
        assert_eq!(config.typewriter_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            provider: Some("claude".to_string()),
            model: Some("claude-3-5-haiku-20241022".to_string()),
            claude_api_key: Some("sk-test".to_string()),
            typewriter_delay_ms: Some(25),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider(), Provider::Claude);
        assert_eq!(loaded.model(), "claude-3-5-haiku-20241022");
        assert_eq!(loaded.claude_api_key.as_deref(), Some("sk-test"));
        assert_eq!(loaded.typewriter_delay(), Duration::from_millis(25));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_unknown_provider_falls_back() {
        let config = Config {
            provider: Some("mystery".to_string()),
            ..Config::default()
        };
        assert_eq!(config.provider(), Provider::Gemini);
    }

    #[test]
    fn test_env_key_overrides_config_key() {
        let config = Config {
            gemini_api_key: Some("from-file".to_string()),
            ..Config::default()
        };

        let key = config.api_key_with(Provider::Gemini, |var| {
            (var == "GOOGLE_API_KEY").then(|| "from-env".to_string())
        });
        assert_eq!(key.as_deref(), Some("from-env"));

        let key = config.api_key_with(Provider::Gemini, |_| None);
        assert_eq!(key.as_deref(), Some("from-file"));

        let key = config.api_key_with(Provider::Gemini, |_| Some(String::new()));
        assert_eq!(key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_ollama_url_precedence_and_scheme() {
        let config = Config {
            ollama_url: Some("http://gpu-box:11434".to_string()),
            ..Config::default()
        };
        assert_eq!(config.ollama_url_with(None), "http://gpu-box:11434");
        assert_eq!(
            config.ollama_url_with(Some("https://ollama.internal".to_string())),
            "https://ollama.internal"
        );
        assert_eq!(
            config.ollama_url_with(Some("127.0.0.1:11434".to_string())),
            "http://127.0.0.1:11434"
        );
        assert_eq!(config.ollama_url_with(Some(String::new())), "http://gpu-box:11434");

        assert_eq!(Config::default().ollama_url_with(None), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = Config::new();
        assert_eq!(config.api_key_with(Provider::Ollama, |_| Some("x".to_string())), None);
    }
}
