//! APDU commands sent to the card
//!
//! An [`ApduRequest`] is an opaque ISO/IEC 7816-4 command: the crate never parses it beyond
//! checking that the 4-byte header is present.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::response::status::common::SUCCESS;
use crate::response::utils::to_hex;

/// Minimum length of an APDU command (CLA, INS, P1, P2)
pub const MIN_APDU_LENGTH: usize = 4;

/// Data to build a single APDU command to be sent to a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduRequest {
    /// Raw command bytes
    apdu: Bytes,
    /// Status words considered successful, `9000` always first
    successful_status_words: Vec<u16>,
    /// Label used in logs
    info: Option<String>,
}

impl ApduRequest {
    /// Create a request from raw command bytes, only `9000` being successful
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if fewer than 4 bytes are provided.
    pub fn new(apdu: impl Into<Bytes>) -> Result<Self> {
        let apdu = apdu.into();
        if apdu.len() < MIN_APDU_LENGTH {
            return Err(Error::invalid_argument(format!(
                "APDU command must hold at least {MIN_APDU_LENGTH} bytes, got {}",
                apdu.len()
            )));
        }

        Ok(Self {
            apdu,
            successful_status_words: vec![SUCCESS.to_u16()],
            info: None,
        })
    }

    /// Add status words to consider successful besides `9000`
    pub fn with_successful_status_words(
        mut self,
        status_words: impl IntoIterator<Item = u16>,
    ) -> Self {
        for status_word in status_words {
            self.add_successful_status_word(status_word);
        }
        self
    }

    /// Add a status word to consider successful, duplicates are ignored
    pub fn add_successful_status_word(&mut self, status_word: u16) -> &mut Self {
        if !self.successful_status_words.contains(&status_word) {
            self.successful_status_words.push(status_word);
        }
        self
    }

    /// Attach a label (e.g. the command name) used in logs
    pub fn with_info<S: Into<String>>(mut self, info: S) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Raw command bytes (at least 4)
    pub const fn apdu(&self) -> &Bytes {
        &self.apdu
    }

    /// Status words considered successful, `9000` included
    pub fn successful_status_words(&self) -> &[u16] {
        &self.successful_status_words
    }

    /// Whether the status word is one of the successful ones
    pub fn is_successful(&self, status_word: u16) -> bool {
        self.successful_status_words.contains(&status_word)
    }

    /// Label of the command, if any
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }
}

impl TryFrom<&[u8]> for ApduRequest {
    type Error = Error;

    fn try_from(apdu: &[u8]) -> Result<Self> {
        Self::new(Bytes::copy_from_slice(apdu))
    }
}

impl fmt::Display for ApduRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "APDU_REQUEST: {{APDU: {}, SUCCESSFUL_STATUS_WORDS: [", to_hex(&self.apdu))?;
        for (i, status_word) in self.successful_status_words.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{status_word:04X}")?;
        }
        write!(f, "], INFO: {}}}", self.info.as_deref().unwrap_or("none"))
    }
}
