pub mod ai;
pub mod analysis;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod turn;

// Re-export main types for convenience
pub use ai::{ClaudeClient, CompletionModel, GeminiClient, ModelClient, OllamaClient, OpenAIClient};
pub use analysis::AnalysisResult;
pub use config::Config;
pub use error::DecodeError;
pub use interpreter::{interpret, strip_code_fences};
pub use prompt::{build_prompt, CATEGORIES, SENTIMENTS, SYSTEM_INSTRUCTION};
pub use provider::Provider;
pub use state::{ChatHistory, ChatMessage, ChatRole};
pub use turn::{analyze_message, begin_turn, finish_turn, TurnOutcome};
