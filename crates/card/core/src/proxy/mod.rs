//! Transmission engine
//!
//! [`ProxyReader`] is the reader-facing contract: transmit a [`CardRequest`], apply a
//! [`ChannelControl`] policy and return a [`CardResponse`], or fail with a
//! [`TransmissionError`] carrying the partial response. [`CardProxy`] implements it on top of any
//! [`ReaderDriver`].
//!
//! Exchanges are strictly sequential: card protocols are stateful and a command may depend on
//! the previous responses. Every exchanging operation takes `&mut self`, so a proxy serves one
//! transmission at a time; callers sharing a reader between threads serialize access themselves.

pub mod config;
pub mod error;

use std::fmt;

use tracing::{Level, debug, info, instrument, warn};

use crate::channel::ChannelControl;
use crate::command::ApduRequest;
use crate::error::{Error, Result};
use crate::reader::{ReaderDriver, ReaderError, RemovalSequencer};
use crate::request::CardRequest;
use crate::response::{ApduResponse, CardResponse};
pub use config::ProxyConfig;
pub use error::{TransmissionError, TransmissionErrorKind};

/// Reader able to transmit card requests and having control over the physical channel
pub trait ProxyReader: fmt::Debug {
    /// Transmit the APDUs of `card_request` in order, apply `channel_control` and return the
    /// responses
    ///
    /// # Errors
    /// Fails with a [`TransmissionError`] of kind
    /// - [`ReaderCommunication`](TransmissionErrorKind::ReaderCommunication) if the reader failed,
    /// - [`CardCommunication`](TransmissionErrorKind::CardCommunication) if the card failed,
    /// - [`UnexpectedStatusWord`](TransmissionErrorKind::UnexpectedStatusWord) if strict status
    ///   checking is enabled and the request stopped on an unsuccessful status word.
    ///
    /// The responses received before the failure are attached to the error.
    fn transmit_card_request(
        &mut self,
        card_request: &CardRequest,
        channel_control: ChannelControl,
    ) -> Result<CardResponse, TransmissionError>;

    /// Release the channel previously established with the card, without sending any APDU
    ///
    /// Releasing an already released channel does nothing, including while a card removal
    /// sequence started in observation mode is pending.
    ///
    /// # Errors
    /// Returns [`Error::ReaderCommunication`] if the reader could not be reached.
    fn release_channel(&mut self) -> Result<()>;

    /// Data returned by the card when powered on, if known
    fn power_on_data(&self) -> Option<String>;
}

/// [`ProxyReader`] implementation driving a [`ReaderDriver`]
pub struct CardProxy<R: ReaderDriver> {
    /// Driver of the physical reader
    reader: R,
    /// Engine configuration
    config: ProxyConfig,
    /// Removal sequence used instead of closing, in observation mode
    removal_sequencer: Option<Box<dyn RemovalSequencer>>,
    /// Logical channel state
    logical_channel_open: bool,
    /// A removal sequence was started and no exchange happened since
    removal_pending: bool,
}

impl<R: ReaderDriver> fmt::Debug for CardProxy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardProxy")
            .field("reader", &self.reader)
            .field("config", &self.config)
            .field("observation_mode", &self.removal_sequencer.is_some())
            .field("logical_channel_open", &self.logical_channel_open)
            .field("removal_pending", &self.removal_pending)
            .finish()
    }
}

impl<R: ReaderDriver> CardProxy<R> {
    /// Create a proxy with the default configuration
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ProxyConfig::default())
    }

    /// Create a proxy with the given configuration
    pub const fn with_config(reader: R, config: ProxyConfig) -> Self {
        Self {
            reader,
            config,
            removal_sequencer: None,
            logical_channel_open: false,
            removal_pending: false,
        }
    }

    /// Run in observation mode: closing the channel starts `sequencer` instead of closing the
    /// physical channel
    pub fn with_removal_sequencer(mut self, sequencer: impl RemovalSequencer + 'static) -> Self {
        self.removal_sequencer = Some(Box::new(sequencer));
        self
    }

    /// Engine configuration
    pub const fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Whether the proxy runs in observation mode
    pub const fn is_observation_mode(&self) -> bool {
        self.removal_sequencer.is_some()
    }

    /// Whether the logical channel is currently open
    pub const fn is_logical_channel_open(&self) -> bool {
        self.logical_channel_open
    }

    /// Reference to the reader driver
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Mutable reference to the reader driver
    pub const fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Take back the reader driver
    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Exchange one APDU and decode the response
    fn exchange(&mut self, request: &ApduRequest) -> Result<ApduResponse, ReaderError> {
        let raw = self.reader.send(request.apdu())?;
        if raw.is_empty() {
            return Err(ReaderError::reader("no bytes returned by the reader"));
        }
        let response = ApduResponse::from_bytes(raw)
            .map_err(|e| ReaderError::card(format!("malformed response: {e}")))?;

        self.logical_channel_open = true;
        self.removal_pending = false;
        log_response(request, &response);
        Ok(response)
    }

    /// End the communication: removal sequence in observation mode, physical close otherwise
    fn close_channels(&mut self) -> Result<(), ReaderError> {
        self.logical_channel_open = false;
        match self.removal_sequencer.as_mut() {
            Some(sequencer) => {
                debug!("Starting card removal sequence");
                sequencer.start_removal_sequence()?;
                self.removal_pending = true;
                Ok(())
            }
            None => {
                debug!("Closing physical channel");
                self.reader.close()
            }
        }
    }

    /// Build the error for a driver failure at APDU `index`
    fn broken_communication(
        &mut self,
        cause: ReaderError,
        index: usize,
        responses: Vec<ApduResponse>,
        expected: usize,
    ) -> TransmissionError {
        let kind = if cause.is_card_failure() {
            self.logical_channel_open = false;
            TransmissionErrorKind::CardCommunication
        } else {
            TransmissionErrorKind::ReaderCommunication
        };
        warn!(index, %kind, error = %cause, "Card request interrupted");

        TransmissionError::new(
            kind,
            format!("APDU #{index} could not be exchanged"),
            CardResponse::new(responses, self.logical_channel_open),
            expected,
        )
        .with_cause(cause)
    }
}

impl<R: ReaderDriver> ProxyReader for CardProxy<R> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(apdus = card_request.len(), channel_control = %channel_control)
    )]
    fn transmit_card_request(
        &mut self,
        card_request: &CardRequest,
        channel_control: ChannelControl,
    ) -> Result<CardResponse, TransmissionError> {
        let expected = card_request.len();
        let mut responses = Vec::with_capacity(expected);

        if !self.reader.is_open() {
            self.logical_channel_open = false;
            return Err(TransmissionError::new(
                TransmissionErrorKind::CardCommunication,
                "physical channel is not open",
                CardResponse::new(responses, false),
                expected,
            ));
        }

        for (index, apdu_request) in card_request.apdu_requests().iter().enumerate() {
            let response = match self.exchange(apdu_request) {
                Ok(response) => response,
                Err(cause) => {
                    return Err(self.broken_communication(cause, index, responses, expected));
                }
            };

            let successful = apdu_request.is_successful(response.status_word());
            let status = response.status();
            responses.push(response);

            if !successful && card_request.stop_on_unsuccessful_status_word() {
                debug!(index, %status, "Unsuccessful status word, stopping card request");
                if self.config.strict_status_words {
                    return Err(TransmissionError::new(
                        TransmissionErrorKind::UnexpectedStatusWord,
                        format!("APDU #{index} returned {status}: {}", status.description()),
                        CardResponse::new(responses, self.logical_channel_open),
                        expected,
                    ));
                }
                break;
            }
        }

        if channel_control.closes_channel() {
            if let Err(cause) = self.close_channels() {
                warn!(error = %cause, "Failed to close the channel");
                return Err(TransmissionError::new(
                    TransmissionErrorKind::ReaderCommunication,
                    "channel could not be closed",
                    CardResponse::new(responses, self.logical_channel_open),
                    expected,
                )
                .with_cause(cause));
            }
        }

        Ok(CardResponse::new(responses, self.logical_channel_open))
    }

    #[instrument(level = "debug", skip_all)]
    fn release_channel(&mut self) -> Result<()> {
        if !self.logical_channel_open && (self.removal_pending || !self.reader.is_open()) {
            debug!("Channel already released");
            return Ok(());
        }
        self.close_channels().map_err(Error::ReaderCommunication)
    }

    fn power_on_data(&self) -> Option<String> {
        self.reader.power_on_data()
    }
}

fn log_response(request: &ApduRequest, response: &ApduResponse) {
    let status = response.status();
    let info = request.info().unwrap_or_default();
    let level = status.tracing_level();
    if level == Level::DEBUG {
        debug!(info, %status, data_len = response.data_out().len(), "APDU exchanged");
    } else if level == Level::INFO {
        info!(info, %status, description = status.description(), "APDU exchanged");
    } else {
        warn!(info, %status, description = status.description(), "APDU exchanged");
    }
}
