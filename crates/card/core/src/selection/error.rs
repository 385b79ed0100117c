//! Card selection parsing failures

use std::error::Error as StdError;

/// The card selection response could not be turned into a smart card
///
/// The most likely reason is an invalid FCI structure returned by the select application
/// command. Raised by [`CardSelectionExtension::parse`](super::CardSelectionExtension::parse)
/// implementations and handed back to the caller untouched.
#[derive(Debug, thiserror::Error)]
#[error("Card selection response parsing failed: {message}")]
pub struct ParseError {
    message: String,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ParseError {
    /// Create a parse error
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a parse error caused by another error
    pub fn with_cause<S, E>(message: S, cause: E) -> Self
    where
        S: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Message describing the failure
    pub fn message(&self) -> &str {
        &self.message
    }
}
