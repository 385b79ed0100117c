//! Configuration options for the transmission engine

/// Configuration of a [`CardProxy`](super::CardProxy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProxyConfig {
    /// Raise [`UnexpectedStatusWord`](super::error::TransmissionErrorKind::UnexpectedStatusWord)
    /// when a card request stops on an unsuccessful status word, instead of returning the
    /// partial response normally
    pub strict_status_words: bool,
}

impl ProxyConfig {
    /// Create the default configuration: unsuccessful status words are recorded, not raised
    pub const fn new() -> Self {
        Self {
            strict_status_words: false,
        }
    }

    /// Set whether unsuccessful status words stopping a card request are raised
    pub const fn with_strict_status_words(mut self, strict: bool) -> Self {
        self.strict_status_words = strict;
        self
    }
}
