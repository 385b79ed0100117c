//! Reader-side collaborators of the transmission engine
//!
//! A [`ReaderDriver`] moves raw bytes to and from the card and controls the physical channel.
//! It knows nothing about card requests, status words or logical channels. A
//! [`RemovalSequencer`] replaces the immediate channel closing when the reader runs in
//! observation mode.

pub mod error;

#[cfg(test)]
pub(crate) mod mock;

use std::fmt;

use bytes::Bytes;
pub use error::ReaderError;
use tracing::{trace, warn};

/// Driver of a physical card reader
///
/// Implementations only have to provide [`do_send`](Self::do_send); [`send`](Self::send) adds
/// tracing around it. A driver is used by a single transmission at a time.
pub trait ReaderDriver: Send + fmt::Debug {
    /// Send raw APDU bytes to the card and return the raw response bytes
    fn send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError> {
        trace!(command = %hex::encode(command), "Sending APDU");
        let result = self.do_send(command);
        match &result {
            Ok(response) => trace!(response = %hex::encode(response), "Received APDU response"),
            Err(e) => warn!(error = %e, "Reader driver failed to exchange APDU"),
        }
        result
    }

    /// Exchange implementation, called by [`send`](Self::send)
    fn do_send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError>;

    /// Whether the physical channel with the card is open
    fn is_open(&self) -> bool;

    /// Close the physical channel
    fn close(&mut self) -> Result<(), ReaderError>;

    /// Data returned by the card when powered on (ATR as hex text), if known
    fn power_on_data(&self) -> Option<String> {
        None
    }
}

/// Card removal sequence used in observation mode
///
/// When installed on a [`CardProxy`](crate::CardProxy), closing the channel starts the removal
/// sequence instead of closing the physical channel right away.
pub trait RemovalSequencer: Send + fmt::Debug {
    /// Start waiting for the card removal
    ///
    /// Called again while a sequence is already running, it must leave that sequence untouched.
    fn start_removal_sequence(&mut self) -> Result<(), ReaderError>;
}

impl<D: ReaderDriver + ?Sized> ReaderDriver for Box<D> {
    fn send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError> {
        (**self).send(command)
    }

    fn do_send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError> {
        (**self).do_send(command)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        (**self).close()
    }

    fn power_on_data(&self) -> Option<String> {
        (**self).power_on_data()
    }
}
