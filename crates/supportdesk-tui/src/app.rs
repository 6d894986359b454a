use std::sync::Arc;
use std::time::{Duration, Instant};
use supportdesk_core::{
    begin_turn, finish_turn, ChatHistory, CompletionModel, Config, DecodeError, ModelClient,
    SYSTEM_INSTRUCTION,
};
use tokio::task::JoinHandle;

use crate::typewriter::Typewriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Why the last turn produced no assistant message.
#[derive(Debug)]
pub enum TurnError {
    /// The model answered with text that is not a complete analysis
    Decode(DecodeError),
    /// The model call itself failed (credentials, network, HTTP status)
    Request(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Session
    pub history: ChatHistory,
    pub last_error: Option<TurnError>,

    // Model
    model: Arc<dyn CompletionModel>,
    pub provider_label: String,
    pub model_label: String,
    pub analysis_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Animation state
    pub typewriter: Option<Typewriter>,
    pub typewriter_delay: Duration,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Transcript scrolling (updated during render)
    pub chat_scroll: u16,
    pub max_chat_scroll: u16,
    pub chat_height: u16,
    pub follow_output: bool,
}

impl App {
    pub fn from_config(config: &Config) -> Self {
        let client = ModelClient::from_config(config);
        let provider_label = client.provider().display_name().to_string();
        let model_label = client.model().to_string();

        Self::new(Arc::new(client), provider_label, model_label, config.typewriter_delay())
    }

    pub fn new(
        model: Arc<dyn CompletionModel>,
        provider_label: String,
        model_label: String,
        typewriter_delay: Duration,
    ) -> Self {
        Self {
            should_quit: false,
            // Start ready to type, like a chat input
            input_mode: InputMode::Editing,

            input: String::new(),
            cursor: 0,

            history: ChatHistory::new(),
            last_error: None,

            model,
            provider_label,
            model_label,
            analysis_task: None,

            typewriter: None,
            typewriter_delay,
            animation_frame: 0,

            chat_scroll: 0,
            max_chat_scroll: 0,
            chat_height: 0,
            follow_output: true,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_task.is_some()
    }

    /// Send the input box contents for analysis.
    ///
    /// Ignored while a previous message is still being analyzed or when the
    /// input is blank. Returns whether a request was started.
    pub fn submit(&mut self) -> bool {
        if self.is_analyzing() || self.input.trim().is_empty() {
            return false;
        }

        let message = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.last_error = None;
        if let Some(typewriter) = self.typewriter.as_mut() {
            typewriter.finish();
        }

        let prompt = begin_turn(&mut self.history, &message);
        tracing::info!(chars = message.chars().count(), "analyzing customer message");

        let model = Arc::clone(&self.model);
        self.analysis_task = Some(tokio::spawn(async move {
            model.complete(SYSTEM_INSTRUCTION, &prompt).await
        }));

        self.follow_output = true;
        true
    }

    /// Collect the model task if it has finished. Never blocks on a running task.
    pub async fn poll_analysis(&mut self) {
        let finished = self
            .analysis_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        let Some(task) = self.analysis_task.take() else {
            return;
        };

        let raw = match task.await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "model request failed");
                self.last_error = Some(TurnError::Request(format!("{:#}", e)));
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "model task did not complete");
                self.last_error = Some(TurnError::Request(e.to_string()));
                return;
            }
        };

        match finish_turn(&mut self.history, &raw) {
            Ok(result) => {
                self.typewriter = Some(Typewriter::new(result.display_text(), self.typewriter_delay));
                self.follow_output = true;
            }
            Err(e) => self.last_error = Some(TurnError::Decode(e)),
        }
    }

    /// Sidebar action: forget the whole session transcript.
    ///
    /// A pending analysis belongs to the discarded transcript, so it is
    /// aborted and its result never reaches the new history.
    pub fn clear_history(&mut self) {
        if let Some(task) = self.analysis_task.take() {
            task.abort();
            tracing::info!("pending analysis dropped with the cleared history");
        }
        self.history.clear();
        self.typewriter = None;
        self.last_error = None;
        self.chat_scroll = 0;
        self.follow_output = true;
        tracing::info!("chat history cleared");
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_analyzing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Advance the typewriter (called by Frame event)
    pub fn tick_typewriter(&mut self, now: Instant) {
        if let Some(typewriter) = self.typewriter.as_mut() {
            typewriter.tick(now);
        }
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_chat_scroll);
        self.follow_output = self.chat_scroll >= self.max_chat_scroll;
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
        self.follow_output = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.chat_height / 2).max(1);
        self.chat_scroll = self.chat_scroll.saturating_add(half).min(self.max_chat_scroll);
        self.follow_output = self.chat_scroll >= self.max_chat_scroll;
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.chat_height / 2).max(1);
        self.chat_scroll = self.chat_scroll.saturating_sub(half);
        self.follow_output = false;
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_output = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll;
        self.follow_output = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use supportdesk_core::ChatRole;

    struct Canned(std::result::Result<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl CompletionModel for Canned {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.0.map(str::to_string).map_err(|e| anyhow!(e))
        }
    }

    fn app_with(reply: std::result::Result<&'static str, &'static str>) -> App {
        App::new(
            Arc::new(Canned(reply)),
            "Test".to_string(),
            "canned".to_string(),
            Duration::from_millis(10),
        )
    }

    async fn settle(app: &mut App) {
        if let Some(task) = app.analysis_task.as_ref() {
            while !task.is_finished() {
                tokio::task::yield_now().await;
            }
        }
        app.poll_analysis().await;
    }

    #[tokio::test]
    async fn test_successful_turn_starts_typewriter() {
        let mut app = app_with(Ok(r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#));
        app.input = "win a free cruise".to_string();
        app.cursor = app.input.chars().count();

        assert!(app.submit());
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.is_analyzing());
        assert_eq!(app.history.len(), 1);

        settle(&mut app).await;

        assert!(!app.is_analyzing());
        assert_eq!(app.history.len(), 2);
        assert_eq!(app.history.last().unwrap().role, ChatRole::Assistant);
        let typewriter = app.typewriter.as_ref().unwrap();
        assert_eq!(typewriter.text(), app.history.last().unwrap().content);
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn test_decode_error_is_surfaced() {
        let mut app = app_with(Ok("Sorry, I can't help with that."));
        app.input = "hello".to_string();
        app.submit();
        settle(&mut app).await;

        assert_eq!(app.history.len(), 1);
        match app.last_error.as_ref() {
            Some(TurnError::Decode(e)) => assert_eq!(e.raw(), "Sorry, I can't help with that."),
            other => panic!("unexpected error state: {other:?}"),
        }
        assert!(app.typewriter.is_none());
    }

    #[tokio::test]
    async fn test_request_error_is_surfaced() {
        let mut app = app_with(Err("GOOGLE_API_KEY is not set"));
        app.input = "hello".to_string();
        app.submit();
        settle(&mut app).await;

        assert_eq!(app.history.len(), 1);
        assert!(matches!(
            app.last_error.as_ref(),
            Some(TurnError::Request(msg)) if msg == "GOOGLE_API_KEY is not set"
        ));
    }

    #[tokio::test]
    async fn test_blank_input_is_not_submitted() {
        let mut app = app_with(Err("unused"));
        app.input = "   ".to_string();
        assert!(!app.submit());
        assert!(app.history.is_empty());
        assert!(!app.is_analyzing());
    }

    #[tokio::test]
    async fn test_only_one_analysis_in_flight() {
        let mut app = app_with(Ok(r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#));
        app.input = "first".to_string();
        assert!(app.submit());

        app.input = "second".to_string();
        assert!(!app.submit());
        assert_eq!(app.input, "second");
        assert_eq!(app.history.len(), 1);
    }

    #[tokio::test]
    async fn test_new_submission_clears_previous_error() {
        let mut app = app_with(Ok("not json"));
        app.input = "one".to_string();
        app.submit();
        settle(&mut app).await;
        assert!(app.last_error.is_some());

        app.input = "two".to_string();
        app.submit();
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let mut app = app_with(Ok(r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#));
        app.input = "hello".to_string();
        app.submit();
        settle(&mut app).await;

        app.clear_history();
        assert!(app.history.is_empty());
        assert!(app.typewriter.is_none());
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn test_clear_history_mid_analysis_drops_the_pending_reply() {
        let mut app = app_with(Ok(r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#));
        app.input = "hello".to_string();
        assert!(app.submit());

        app.clear_history();
        assert!(!app.is_analyzing());

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        settle(&mut app).await;
        assert!(app.history.is_empty());
        assert!(app.typewriter.is_none());

        // A fresh turn starts cleanly afterwards
        app.input = "again".to_string();
        assert!(app.submit());
        settle(&mut app).await;
        let roles: Vec<_> = app.history.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
    }

    #[tokio::test]
    async fn test_clear_history_mid_analysis_drops_the_pending_error() {
        let mut app = app_with(Err("network down"));
        app.input = "hello".to_string();
        app.submit();

        app.clear_history();
        settle(&mut app).await;
        assert!(app.last_error.is_none());
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let mut app = app_with(Err("unused"));
        app.max_chat_scroll = 3;
        app.chat_height = 4;

        app.scroll_half_page_down();
        app.scroll_half_page_down();
        assert_eq!(app.chat_scroll, 3);
        assert!(app.follow_output);

        app.scroll_up();
        assert_eq!(app.chat_scroll, 2);
        assert!(!app.follow_output);

        app.scroll_to_top();
        app.scroll_up();
        assert_eq!(app.chat_scroll, 0);
    }
}
