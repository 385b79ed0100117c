//! Responses received from the card
//!
//! An [`ApduResponse`] is the answer to a single APDU, a [`CardResponse`] groups the answers to
//! all the APDUs of a [`CardRequest`](crate::CardRequest) together with the state of the logical
//! channel once the request has been processed.

pub mod status;
pub mod utils;

use std::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::error::Result;
use status::StatusWord;

/// Data received in response to an APDU command: a data part of variable length followed by
/// the status word (SW1SW2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    /// Raw bytes, status word included
    apdu: Bytes,
    /// Data part, sharing the buffer of `apdu`
    data_out: Bytes,
    /// Trailing status word
    status: StatusWord,
}

impl ApduResponse {
    /// Decode raw bytes received from the card
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if fewer than 2 bytes
    /// are provided.
    pub fn from_bytes(apdu: impl Into<Bytes>) -> Result<Self> {
        let apdu = apdu.into();
        let (data_out, status) = utils::split_status_word(&apdu)?;

        trace!(
            status = %status,
            data_len = data_out.len(),
            "Decoded APDU response"
        );

        Ok(Self {
            apdu,
            data_out,
            status,
        })
    }

    /// Raw bytes received from the card, status word included (at least 2 bytes)
    pub const fn apdu(&self) -> &Bytes {
        &self.apdu
    }

    /// Data part of the response, status word excluded (possibly empty)
    pub const fn data_out(&self) -> &Bytes {
        &self.data_out
    }

    /// Status word as an integer between 0000h and FFFFh
    pub const fn status_word(&self) -> u16 {
        self.status.to_u16()
    }

    /// Status word as a [`StatusWord`]
    pub const fn status(&self) -> StatusWord {
        self.status
    }
}

impl TryFrom<&[u8]> for ApduResponse {
    type Error = crate::Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::from_bytes(Bytes::copy_from_slice(data))
    }
}

impl TryFrom<Bytes> for ApduResponse {
    type Error = crate::Error;

    fn try_from(data: Bytes) -> Result<Self> {
        Self::from_bytes(data)
    }
}

impl fmt::Display for ApduResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "APDU_RESPONSE: {{APDU: {}, DATA_OUT: {}, STATUS_WORD: {}}}",
            utils::to_hex(&self.apdu),
            utils::to_hex(&self.data_out),
            self.status
        )
    }
}

/// Group of APDU responses received for a [`CardRequest`](crate::CardRequest)
///
/// Responses keep the order of the requests. Fewer responses than requests are present when
/// processing stopped on an unsuccessful status word, or when the response is attached to a
/// [`TransmissionError`](crate::TransmissionError).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardResponse {
    apdu_responses: Vec<ApduResponse>,
    is_logical_channel_open: bool,
}

impl CardResponse {
    /// Create a card response from the collected APDU responses
    pub const fn new(apdu_responses: Vec<ApduResponse>, is_logical_channel_open: bool) -> Self {
        Self {
            apdu_responses,
            is_logical_channel_open,
        }
    }

    /// All the responses received, empty if there is none
    pub fn apdu_responses(&self) -> &[ApduResponse] {
        &self.apdu_responses
    }

    /// Take ownership of the responses
    pub fn into_apdu_responses(self) -> Vec<ApduResponse> {
        self.apdu_responses
    }

    /// State of the logical channel after the request was processed
    pub const fn is_logical_channel_open(&self) -> bool {
        self.is_logical_channel_open
    }

    /// Number of responses received
    pub fn len(&self) -> usize {
        self.apdu_responses.len()
    }

    /// Whether no response was received
    pub fn is_empty(&self) -> bool {
        self.apdu_responses.is_empty()
    }

    /// Last response received, if any
    pub fn last(&self) -> Option<&ApduResponse> {
        self.apdu_responses.last()
    }
}

impl fmt::Display for CardResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CARD_RESPONSE: {{IS_LOGICAL_CHANNEL_OPEN: {}, APDU_RESPONSES: [",
            self.is_logical_channel_open
        )?;
        for (i, response) in self.apdu_responses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{response}")?;
        }
        f.write_str("]}")
    }
}
