use thiserror::Error;

use crate::llm::Provider;

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("nothing to interpret")]
    EmptyInput,

    #[error("no API key configured for {0}")]
    MissingCredentials(Provider),

    #[error("{provider} request failed: {message}")]
    Transport { provider: Provider, message: String },

    #[error("unexpected response from the model: {0}")]
    Malformed(String),

    #[error("the model could not find a transaction in that text")]
    Declined,
}

impl InterpretError {
    pub(crate) fn transport(provider: Provider, err: impl std::fmt::Display) -> Self {
        InterpretError::Transport {
            provider,
            message: err.to_string(),
        }
    }

    /// Short message suitable for showing next to the entry form.
    pub fn user_message(&self) -> String {
        match self {
            InterpretError::EmptyInput => "Type a description first.".to_string(),
            InterpretError::Declined => {
                "Could not parse text. Please enter manually or try rephrasing.".to_string()
            }
            InterpretError::MissingCredentials(p) => format!(
                "No API key for {p}. Run `tally auth set-key {p}` or set {}.",
                p.api_key_env()
            ),
            InterpretError::Transport { .. } | InterpretError::Malformed(_) => {
                format!("Error parsing text ({self}). Please enter manually.")
            }
        }
    }

    /// Whether retrying the same text could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InterpretError::Transport { .. } | InterpretError::Malformed(_))
    }
}
