//! Failures reported by reader drivers

/// Failure signalled by a [`ReaderDriver`](super::ReaderDriver)
///
/// Variants are split by origin: the reader itself, or the card behind a working reader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    /// The reader is unreachable or broken
    #[error("Reader failure: {0}")]
    Reader(String),

    /// The reader did not answer in time
    #[error("Reader timed out")]
    Timeout,

    /// The reader works but the card did not respond properly
    #[error("Card failure: {0}")]
    Card(String),

    /// The card left the field during the exchange
    #[error("Card removed")]
    CardRemoved,
}

impl ReaderError {
    /// Create a reader-level failure
    pub fn reader<S: Into<String>>(message: S) -> Self {
        Self::Reader(message.into())
    }

    /// Create a card-level failure
    pub fn card<S: Into<String>>(message: S) -> Self {
        Self::Card(message.into())
    }

    /// Whether the failure comes from the card rather than from the reader
    pub const fn is_card_failure(&self) -> bool {
        matches!(self, Self::Card(_) | Self::CardRemoved)
    }
}
