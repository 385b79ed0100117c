//! Card selection criteria and SELECT APPLICATION encoding

use bytes::{BufMut, Bytes, BytesMut};
use derive_more::Display;

use crate::command::ApduRequest;
use crate::error::{Error, Result};
use crate::response::status::common::SUCCESS;

/// Minimum AID length accepted by a selector
pub const AID_MIN_LENGTH: usize = 5;

/// Maximum AID length accepted by a selector
pub const AID_MAX_LENGTH: usize = 16;

const CLA_ISO7816: u8 = 0x00;
const INS_SELECT: u8 = 0xA4;
const P1_SELECT_BY_NAME: u8 = 0x04;

/// Which occurrence of the application to select when several share the AID prefix
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FileOccurrence {
    /// First or only occurrence
    #[default]
    #[display("FIRST")]
    First = 0x00,
    /// Last occurrence
    #[display("LAST")]
    Last = 0x01,
    /// Next occurrence
    #[display("NEXT")]
    Next = 0x02,
    /// Previous occurrence
    #[display("PREVIOUS")]
    Previous = 0x03,
}

/// Which template the card returns in response to the selection
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FileControlInformation {
    /// File control information
    #[default]
    #[display("FCI")]
    Fci = 0x00,
    /// File control parameters
    #[display("FCP")]
    Fcp = 0x04,
    /// File management data
    #[display("FMD")]
    Fmd = 0x08,
    /// No response data
    #[display("NO_RESPONSE")]
    NoResponse = 0x0C,
}

/// Criteria identifying the targeted card application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelector {
    aid: Option<Bytes>,
    file_occurrence: FileOccurrence,
    file_control_information: FileControlInformation,
    successful_selection_status_words: Vec<u16>,
}

impl Default for CardSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSelector {
    /// Selector accepting any card, only `9000` being a successful selection
    pub fn new() -> Self {
        Self {
            aid: None,
            file_occurrence: FileOccurrence::default(),
            file_control_information: FileControlInformation::default(),
            successful_selection_status_words: vec![SUCCESS.to_u16()],
        }
    }

    /// Select the application by its AID (DF name)
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the AID is not 5 to 16 bytes long.
    pub fn filter_by_aid(mut self, aid: impl Into<Bytes>) -> Result<Self> {
        let aid = aid.into();
        if !(AID_MIN_LENGTH..=AID_MAX_LENGTH).contains(&aid.len()) {
            return Err(Error::invalid_argument(format!(
                "AID must be {AID_MIN_LENGTH} to {AID_MAX_LENGTH} bytes long, got {}",
                aid.len()
            )));
        }
        self.aid = Some(aid);
        Ok(self)
    }

    /// Set the occurrence to select
    pub const fn with_file_occurrence(mut self, file_occurrence: FileOccurrence) -> Self {
        self.file_occurrence = file_occurrence;
        self
    }

    /// Set the template expected in response
    pub const fn with_file_control_information(
        mut self,
        file_control_information: FileControlInformation,
    ) -> Self {
        self.file_control_information = file_control_information;
        self
    }

    /// Also accept `status_word` as a successful selection (e.g. `6283`, application
    /// deactivated)
    pub fn add_successful_selection_status_word(mut self, status_word: u16) -> Self {
        if !self.successful_selection_status_words.contains(&status_word) {
            self.successful_selection_status_words.push(status_word);
        }
        self
    }

    /// Targeted AID, if any
    pub const fn aid(&self) -> Option<&Bytes> {
        self.aid.as_ref()
    }

    /// Occurrence to select
    pub const fn file_occurrence(&self) -> FileOccurrence {
        self.file_occurrence
    }

    /// Template expected in response
    pub const fn file_control_information(&self) -> FileControlInformation {
        self.file_control_information
    }

    /// Status words meaning the application was selected, `9000` included
    pub fn successful_selection_status_words(&self) -> &[u16] {
        &self.successful_selection_status_words
    }

    /// Whether `status_word` means the application was selected
    pub fn is_successful_selection(&self, status_word: u16) -> bool {
        self.successful_selection_status_words.contains(&status_word)
    }

    /// SELECT APPLICATION command for the AID, `None` when the selector has no AID
    ///
    /// Encoded as `00 A4 04 P2 Lc AID 00` with `P2 = FCI template | occurrence`.
    pub fn select_application_request(&self) -> Result<Option<ApduRequest>> {
        let Some(aid) = &self.aid else {
            return Ok(None);
        };

        let p2 = self.file_control_information as u8 | self.file_occurrence as u8;
        let mut apdu = BytesMut::with_capacity(aid.len() + 6);
        apdu.put_u8(CLA_ISO7816);
        apdu.put_u8(INS_SELECT);
        apdu.put_u8(P1_SELECT_BY_NAME);
        apdu.put_u8(p2);
        apdu.put_u8(aid.len() as u8);
        apdu.put_slice(aid);
        apdu.put_u8(0x00);

        let request = ApduRequest::new(apdu.freeze())?
            .with_successful_status_words(self.successful_selection_status_words.iter().copied())
            .with_info("Select Application");
        Ok(Some(request))
    }
}
