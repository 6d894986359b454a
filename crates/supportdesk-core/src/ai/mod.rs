pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::Config;
use crate::provider::Provider;

/// A hosted model that turns a system instruction and a prompt into text.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
enum Backend {
    Gemini(GeminiClient),
    Claude(ClaudeClient),
    OpenAI(OpenAIClient),
    Ollama(OllamaClient),
    /// Provider selected but its key is absent; calls fail with this variable name.
    MissingKey(&'static str),
}

/// The configured provider and model, ready to be cloned into a background task.
#[derive(Clone)]
pub struct ModelClient {
    provider: Provider,
    model: String,
    backend: Backend,
}

impl ModelClient {
    pub fn from_config(config: &Config) -> Self {
        let provider = config.provider();
        let model = config.model();

        let backend = match (provider, config.api_key(provider)) {
            (Provider::Ollama, _) => Backend::Ollama(OllamaClient::new(&config.ollama_url())),
            (Provider::Gemini, Some(key)) => Backend::Gemini(GeminiClient::new(&key)),
            (Provider::Claude, Some(key)) => Backend::Claude(ClaudeClient::new(&key)),
            (Provider::OpenAI, Some(key)) => Backend::OpenAI(OpenAIClient::new(&key)),
            (_, None) => Backend::MissingKey(provider.api_key_var().unwrap_or("API key")),
        };

        if let Backend::MissingKey(var) = &backend {
            tracing::warn!(provider = provider.as_str(), var, "no API key configured; requests will fail");
        }

        Self { provider, model, backend }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for ModelClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        tracing::debug!(provider = self.provider.as_str(), model = %self.model, "sending completion request");

        match &self.backend {
            Backend::Gemini(client) => client.query(&self.model, system, prompt).await,
            Backend::Claude(client) => client.query(&self.model, system, prompt).await,
            Backend::OpenAI(client) => client.query(&self.model, system, prompt).await,
            Backend::Ollama(client) => client.query(&self.model, system, prompt).await,
            Backend::MissingKey(var) => Err(anyhow!("{} is not set", var)),
        }
    }
}
