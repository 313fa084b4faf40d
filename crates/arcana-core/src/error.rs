use arcana_schema::Locale;
use thiserror::Error;

use crate::prompts;

/// Caller-facing message for a rejected or empty follow-up. The original
/// flow never localized the follow-up surface, so these stay English.
pub const EMPTY_FOLLOWUP_MESSAGE: &str = "Please enter a follow-up question.";
pub const NOT_FOUND_MESSAGE: &str = "Conversation not found or unauthorized access.";
pub const FOLLOWUP_FAILURE_MESSAGE: &str = "Failed to generate response. Please try again later.";
pub const INVALID_QUESTION_MESSAGE: &str =
    "Your question could not be accepted. Please rephrase it and try again.";

/// Error taxonomy for the reading pipeline. Internal detail stays in the
/// source chain for logging; callers only ever see `user_message`.
#[derive(Debug, Error)]
pub enum ReadingError {
    /// Terminal: the caller must re-authenticate. Mapped to a redirect,
    /// never to an error payload.
    #[error("authentication required")]
    AuthRequired,

    #[error("server configuration error: {0}")]
    Configuration(String),

    /// Malformed spread: empty, blank card fields, or duplicate positions.
    #[error("invalid card selection")]
    InvalidSelection,

    /// The question validator classified the input as unacceptable.
    #[error("question rejected by the validator")]
    InvalidQuestion,

    #[error("empty follow-up question")]
    EmptyFollowUp,

    /// Covers both a missing conversation and one owned by another user;
    /// the two are deliberately indistinguishable to the caller.
    #[error("conversation not found or unauthorized access")]
    NotFoundOrUnauthorized,

    /// The model produced output that is not a valid structured reading.
    #[error("reading did not conform to the response contract: {0}")]
    MalformedReading(#[from] serde_json::Error),

    #[error("generation failed: {0}")]
    Generation(#[from] anyhow::Error),
}

impl ReadingError {
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ReadingError::AuthRequired)
    }

    /// The string shown to the caller for a failed start operation.
    pub fn user_message(&self, locale: Locale) -> &'static str {
        match self {
            ReadingError::AuthRequired => "Authentication required.",
            ReadingError::Configuration(_) => prompts::error_server_config(locale),
            ReadingError::InvalidSelection => prompts::error_invalid_card_selection(locale),
            ReadingError::InvalidQuestion => INVALID_QUESTION_MESSAGE,
            ReadingError::EmptyFollowUp => EMPTY_FOLLOWUP_MESSAGE,
            ReadingError::NotFoundOrUnauthorized => NOT_FOUND_MESSAGE,
            ReadingError::MalformedReading(_) | ReadingError::Generation(_) => {
                prompts::error_failed_to_generate_reading(locale)
            }
        }
    }

    /// The string shown to the caller for a failed continue operation:
    /// every generation-side fault collapses to one generic message.
    pub fn followup_message(&self) -> &'static str {
        match self {
            ReadingError::AuthRequired => "Authentication required.",
            ReadingError::EmptyFollowUp => EMPTY_FOLLOWUP_MESSAGE,
            ReadingError::NotFoundOrUnauthorized => NOT_FOUND_MESSAGE,
            _ => FOLLOWUP_FAILURE_MESSAGE,
        }
    }
}
