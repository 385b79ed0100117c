//! Failures of a card request transmission

use derive_more::Display;

use crate::reader::error::ReaderError;
use crate::response::CardResponse;

/// What interrupted a card request transmission
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransmissionErrorKind {
    /// The reader is unreachable or broken
    #[display("Reader communication failure")]
    ReaderCommunication,

    /// The reader works but the card failed to respond or was removed
    #[display("Card communication failure")]
    CardCommunication,

    /// A status word outside the successful set was received while strict checking is enabled
    #[display("Unexpected status word")]
    UnexpectedStatusWord,
}

/// Failure of a card request transmission, carrying the responses received until then
///
/// The response is complete when it holds as many APDU responses as the card request held APDU
/// requests, whatever the status word of the last one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransmissionError {
    kind: TransmissionErrorKind,
    message: String,
    card_response: CardResponse,
    is_card_response_complete: bool,
    #[source]
    cause: Option<ReaderError>,
}

impl TransmissionError {
    /// Create an error from the responses collected for a request of `expected` APDUs
    pub fn new<S: Into<String>>(
        kind: TransmissionErrorKind,
        message: S,
        card_response: CardResponse,
        expected: usize,
    ) -> Self {
        let is_card_response_complete = card_response.len() == expected;
        Self {
            kind,
            message: message.into(),
            card_response,
            is_card_response_complete,
            cause: None,
        }
    }

    /// Attach the driver failure that caused the error
    pub fn with_cause(mut self, cause: ReaderError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Kind of failure
    pub const fn kind(&self) -> TransmissionErrorKind {
        self.kind
    }

    /// Message describing the failure context
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Responses received before the failure
    pub const fn card_response(&self) -> &CardResponse {
        &self.card_response
    }

    /// Take ownership of the responses received before the failure
    pub fn into_card_response(self) -> CardResponse {
        self.card_response
    }

    /// Whether a response was received for every APDU of the card request
    pub const fn is_card_response_complete(&self) -> bool {
        self.is_card_response_complete
    }

    /// Driver failure at the origin of the error, if any
    pub const fn cause(&self) -> Option<&ReaderError> {
        self.cause.as_ref()
    }

    /// Status word of the last response received, if any
    pub fn last_status_word(&self) -> Option<u16> {
        self.card_response.last().map(|r| r.status_word())
    }
}
