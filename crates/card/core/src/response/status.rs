//! Status word (SW1SW2) handling for APDU responses

use std::fmt;

use tracing::Level;

/// Status word closing every APDU response, stored as `SW1 << 8 | SW2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusWord(u16);

impl StatusWord {
    /// Build a status word from its two bytes
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self(((sw1 as u16) << 8) | sw2 as u16)
    }

    /// Build a status word from its numeric value
    pub const fn from_u16(value: u16) -> Self {
        Self(value)
    }

    /// Numeric value, between 0000h and FFFFh
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// First status byte
    pub const fn sw1(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Second status byte
    pub const fn sw2(self) -> u8 {
        self.0 as u8
    }

    /// `90 00`
    pub const fn is_success(self) -> bool {
        self.0 == common::SUCCESS.0
    }

    /// `61 XX`, more response bytes are available
    pub const fn is_more_data_available(self) -> bool {
        self.sw1() == 0x61
    }

    /// `62 XX` or `63 XX`
    pub const fn is_warning(self) -> bool {
        matches!(self.sw1(), 0x62 | 0x63)
    }

    /// `64 XX` to `6F XX`
    pub const fn is_error(self) -> bool {
        matches!(self.sw1(), 0x64..=0x6F)
    }

    /// Level used when a response carrying this status word is logged
    pub const fn tracing_level(self) -> Level {
        if self.is_success() || self.is_more_data_available() {
            Level::DEBUG
        } else if self.is_warning() {
            Level::INFO
        } else {
            Level::WARN
        }
    }

    /// Short ISO/IEC 7816-4 meaning of the status word
    pub const fn description(self) -> &'static str {
        match (self.sw1(), self.sw2()) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x62, 0x81) => "Part of returned data may be corrupted",
            (0x62, 0x82) => "End of file reached before reading Le bytes",
            (0x62, 0x83) => "Selected file deactivated",
            (0x62, _) => "Warning, non-volatile memory unchanged",
            (0x63, n) if n & 0xF0 == 0xC0 => "Counter value",
            (0x63, _) => "Warning, non-volatile memory changed",
            (0x64, _) => "Execution error, non-volatile memory unchanged",
            (0x65, _) => "Execution error, non-volatile memory changed",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x81) => "Logical channel not supported",
            (0x68, 0x82) => "Secure messaging not supported",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x69, 0x86) => "Command not allowed",
            (0x6A, 0x81) => "Function not supported",
            (0x6A, 0x82) => "File or application not found",
            (0x6A, 0x83) => "Record not found",
            (0x6A, 0x86) => "Incorrect parameters P1-P2",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6B, 0x00) => "Wrong parameters P1-P2",
            (0x6C, _) => "Wrong Le field",
            (0x6D, 0x00) => "Instruction code not supported",
            (0x6E, 0x00) => "Class not supported",
            (0x6F, 0x00) => "No precise diagnosis",
            _ => "Unknown status word",
        }
    }
}

impl From<u16> for StatusWord {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Frequently met status words
pub mod common {
    use super::StatusWord;

    /// Success (90 00)
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);

    /// Selected file deactivated (62 83)
    pub const FILE_DEACTIVATED: StatusWord = StatusWord::new(0x62, 0x83);

    /// Wrong length (67 00)
    pub const WRONG_LENGTH: StatusWord = StatusWord::new(0x67, 0x00);

    /// Security status not satisfied (69 82)
    pub const SECURITY_CONDITION_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x82);

    /// Command not allowed (69 86)
    pub const COMMAND_NOT_ALLOWED: StatusWord = StatusWord::new(0x69, 0x86);

    /// File or application not found (6A 82)
    pub const FILE_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x82);

    /// Instruction code not supported (6D 00)
    pub const INVALID_INSTRUCTION: StatusWord = StatusWord::new(0x6D, 0x00);
}
