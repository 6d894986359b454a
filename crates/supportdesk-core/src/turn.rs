//! One analysis turn: user message in, assistant turn (maybe) out.
//!
//! The steps are split so a UI can run the model call on a background task
//! between `begin_turn` and `finish_turn`. Each message is analyzed on its
//! own; earlier turns are never sent to the model.

use anyhow::Result;

use crate::ai::CompletionModel;
use crate::analysis::AnalysisResult;
use crate::error::DecodeError;
use crate::interpreter::interpret;
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::state::{ChatHistory, ChatMessage};

#[derive(Debug)]
pub enum TurnOutcome {
    Answered(AnalysisResult),
    /// The model answered but its text could not be decoded. History holds
    /// only the user turn.
    Undecodable(DecodeError),
}

/// Record the user's message and return the prompt to send.
pub fn begin_turn(history: &mut ChatHistory, message: &str) -> String {
    history.push(ChatMessage::user(message));
    build_prompt(message)
}

/// Decode the model output, appending the assistant turn only on success.
pub fn finish_turn(history: &mut ChatHistory, raw: &str) -> Result<AnalysisResult, DecodeError> {
    match interpret(raw) {
        Ok(result) => {
            tracing::info!(category = %result.category, sentiment = %result.sentiment, "message analyzed");
            history.push(ChatMessage::assistant(result.display_text()));
            Ok(result)
        }
        Err(err) => {
            tracing::warn!(error = %err, raw = err.raw(), "could not decode model response");
            Err(err)
        }
    }
}

/// Run a whole turn inline. Model failures are returned as `Err`.
pub async fn analyze_message<M>(model: &M, history: &mut ChatHistory, message: &str) -> Result<TurnOutcome>
where
    M: CompletionModel + ?Sized,
{
    let prompt = begin_turn(history, message);
    let raw = model.complete(SYSTEM_INSTRUCTION, &prompt).await?;

    Ok(match finish_turn(history, &raw) {
        Ok(result) => TurnOutcome::Answered(result),
        Err(err) => TurnOutcome::Undecodable(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;

    #[test]
    fn test_begin_turn_records_user_message() {
        let mut history = ChatHistory::new();
        let prompt = begin_turn(&mut history, "Where is my order?");

        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0], ChatMessage::user("Where is my order?"));
        assert!(prompt.contains("Where is my order?"));
    }

    #[test]
    fn test_finish_turn_appends_assistant() {
        let mut history = ChatHistory::new();
        begin_turn(&mut history, "spam spam");
        let result = finish_turn(&mut history, r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#).unwrap();

        assert_eq!(history.len(), 2);
        let last = history.last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, result.display_text());
    }

    #[test]
    fn test_finish_turn_failure_leaves_history() {
        let mut history = ChatHistory::new();
        begin_turn(&mut history, "hello");
        assert!(finish_turn(&mut history, r#"{"category":"Spam""#).is_err());
        assert!(finish_turn(&mut history, r#"{"category":"Spam","reply":"x"}"#).is_err());

        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().role, ChatRole::User);
    }
}
