//! Crate-level error type
//!
//! Every fallible operation of the crate surfaces one of the variants below. Errors raised while
//! a [`CardRequest`](crate::CardRequest) is being transmitted carry the partial response
//! collected so far through [`TransmissionError`].

use crate::proxy::error::TransmissionError;
use crate::reader::error::ReaderError;
use crate::selection::error::ParseError;

/// Result alias used throughout the crate
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Error type covering all the failures of the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input: too short command or response, empty card request, invalid AID...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The reader could not be reached outside of a card request transmission
    #[error("Reader communication failure: {0}")]
    ReaderCommunication(#[source] ReaderError),

    /// A card request transmission failed, see [`TransmissionError::kind`]
    #[error(transparent)]
    Transmission(#[from] TransmissionError),

    /// The card selection response could not be turned into a smart card
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error with additional context
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Wrapped error
        source: Box<Self>,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap the error with a context message
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping context layers
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Transmission error carried by this error, if any
    pub fn as_transmission(&self) -> Option<&TransmissionError> {
        match self.root() {
            Self::Transmission(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ReaderError> for Error {
    fn from(error: ReaderError) -> Self {
        Self::ReaderCommunication(error)
    }
}

/// Extension trait adding context to results
pub trait ResultExt<T> {
    /// Add context to the error, if any
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
