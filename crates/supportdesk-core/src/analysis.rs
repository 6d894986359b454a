use serde::{Deserialize, Serialize};

use crate::prompt::{CATEGORIES, SENTIMENTS};

/// The structured outcome of analyzing one customer message.
///
/// Fields are kept as the model produced them. Values outside the prompted
/// lists are not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: String,
    pub sentiment: String,
    pub reply: String,
}

impl AnalysisResult {
    pub fn has_known_category(&self) -> bool {
        CATEGORIES.contains(&self.category.as_str())
    }

    pub fn has_known_sentiment(&self) -> bool {
        SENTIMENTS.contains(&self.sentiment.as_str())
    }

    /// Markdown shown in the transcript for the assistant turn.
    pub fn display_text(&self) -> String {
        format!(
            "**📋 Category:** {}\n\n**😊 Sentiment:** {}\n\n**✉️ Suggested Reply:**\n\n{}",
            self.category, self.sentiment, self.reply
        )
    }
}
