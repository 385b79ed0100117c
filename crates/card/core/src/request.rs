//! Card requests: ordered groups of APDU commands

use std::fmt;

use crate::command::ApduRequest;
use crate::error::{Error, Result};

/// Group of APDU requests executed consecutively
///
/// Selections without follow-up commands use no card request at all rather than an empty one,
/// hence a card request always holds at least one APDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    apdu_requests: Vec<ApduRequest>,
    stop_on_unsuccessful_status_word: bool,
}

impl CardRequest {
    /// Create a card request
    ///
    /// When `stop_on_unsuccessful_status_word` is set, processing stops at the first response
    /// whose status word is not one of its request's successful status words.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `apdu_requests` is empty.
    pub fn new(
        apdu_requests: Vec<ApduRequest>,
        stop_on_unsuccessful_status_word: bool,
    ) -> Result<Self> {
        if apdu_requests.is_empty() {
            return Err(Error::invalid_argument(
                "card request must hold at least one APDU request",
            ));
        }

        Ok(Self {
            apdu_requests,
            stop_on_unsuccessful_status_word,
        })
    }

    /// The APDU requests, never empty
    pub fn apdu_requests(&self) -> &[ApduRequest] {
        &self.apdu_requests
    }

    /// Whether processing stops at the first unsuccessful status word
    pub const fn stop_on_unsuccessful_status_word(&self) -> bool {
        self.stop_on_unsuccessful_status_word
    }

    /// Number of APDU requests
    pub fn len(&self) -> usize {
        self.apdu_requests.len()
    }

    /// Always `false`, kept for symmetry with [`len`](Self::len)
    pub fn is_empty(&self) -> bool {
        self.apdu_requests.is_empty()
    }
}

impl fmt::Display for CardRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CARD_REQUEST: {{STOP_ON_UNSUCCESSFUL_STATUS_WORD: {}, APDU_REQUESTS: [",
            self.stop_on_unsuccessful_status_word
        )?;
        for (i, request) in self.apdu_requests.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{request}")?;
        }
        f.write_str("]}")
    }
}
