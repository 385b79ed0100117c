//! Card-side contracts for smart card communication
//!
//! This crate defines how an application talks to a smart card through a reader, according to
//! ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! - [`ApduRequest`] and [`ApduResponse`] model a single command/response exchange
//! - [`CardRequest`] groups the commands sent in one transmission, [`CardResponse`] collects the
//!   responses
//! - [`ProxyReader`] transmits card requests under a [`ChannelControl`] policy; [`CardProxy`] is
//!   the reference engine on top of a [`ReaderDriver`]
//! - [`selection`] lets card extensions select an application and build their smart card
//!
//! Failures during a transmission surface as [`TransmissionError`], which always carries the
//! responses received before the failure.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub use bytes::Bytes;

pub mod channel;
pub mod command;
pub mod error;
pub mod properties;
pub mod proxy;
pub mod reader;
pub mod request;
pub mod response;
pub mod selection;

pub use channel::ChannelControl;
pub use command::ApduRequest;
pub use error::{Error, Result, ResultExt};
pub use proxy::{CardProxy, ProxyConfig, ProxyReader, TransmissionError, TransmissionErrorKind};
pub use reader::{ReaderDriver, ReaderError, RemovalSequencer};
pub use request::CardRequest;
pub use response::status::StatusWord;
pub use response::{ApduResponse, CardResponse};
pub use selection::{
    CardSelectionExtension, CardSelectionRequest, CardSelectionResolver, CardSelectionResponse,
    CardSelector, ParseError, SelectionOutcome, SmartCard,
};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{Bytes, Error, Result, ResultExt};

    // Exchange model
    pub use crate::response::status::{StatusWord, common as status};
    pub use crate::{ApduRequest, ApduResponse, CardRequest, CardResponse, ChannelControl};

    // Transmission
    pub use crate::{
        CardProxy, ProxyConfig, ProxyReader, ReaderDriver, ReaderError, RemovalSequencer,
        TransmissionError, TransmissionErrorKind,
    };

    // Selection
    pub use crate::selection::{FileControlInformation, FileOccurrence};
    pub use crate::{
        CardSelectionExtension, CardSelectionRequest, CardSelectionResolver,
        CardSelectionResponse, CardSelector, ParseError, SelectionOutcome, SmartCard,
    };
}
