use thiserror::Error;

/// Failure to turn model output into a complete [`crate::AnalysisResult`].
///
/// Every variant keeps the cleaned model text so the UI can show it.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("model returned invalid JSON: {source}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model returned JSON that is not an object")]
    NotAnObject { raw: String },

    #[error("model response is missing the `{field}` field")]
    MissingField { raw: String, field: &'static str },
}

impl DecodeError {
    /// The model text that failed to decode, after fence stripping.
    pub fn raw(&self) -> &str {
        match self {
            DecodeError::InvalidJson { raw, .. } => raw,
            DecodeError::NotAnObject { raw } => raw,
            DecodeError::MissingField { raw, .. } => raw,
        }
    }
}
