//! Card selection
//!
//! A card extension describes what it wants to select through a [`CardSelectionRequest`] and
//! turns the resulting [`CardSelectionResponse`] into its own [`SmartCard`] type. The
//! [`CardSelectionResolver`] runs the selection on a [`ProxyReader`] and hands the response to
//! the extension.

pub mod error;
pub mod selector;

use std::fmt;

use tracing::{debug, instrument};

use crate::channel::ChannelControl;
use crate::error::{Result, ResultExt};
use crate::proxy::ProxyReader;
use crate::request::CardRequest;
use crate::response::{ApduResponse, CardResponse};
pub use error::ParseError;
pub use selector::{CardSelector, FileControlInformation, FileOccurrence};

/// Marker for the smart card types produced by card extensions
pub trait SmartCard: fmt::Debug {}

/// Data provided as input to the selection process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectionRequest {
    card_selector: CardSelector,
    card_request: Option<CardRequest>,
}

impl CardSelectionRequest {
    /// Create a selection request without follow-up commands
    pub const fn new(card_selector: CardSelector) -> Self {
        Self {
            card_selector,
            card_request: None,
        }
    }

    /// Add a card request executed after a successful selection
    pub fn with_card_request(mut self, card_request: CardRequest) -> Self {
        self.card_request = Some(card_request);
        self
    }

    /// Selection criteria
    pub const fn card_selector(&self) -> &CardSelector {
        &self.card_selector
    }

    /// Card request executed after a successful selection, if any
    pub const fn card_request(&self) -> Option<&CardRequest> {
        self.card_request.as_ref()
    }
}

/// Outcome of the selection process, input of [`CardSelectionExtension::parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectionResponse {
    power_on_data: Option<String>,
    select_application_response: Option<ApduResponse>,
    has_matched: bool,
    card_response: Option<CardResponse>,
}

impl CardSelectionResponse {
    /// Assemble a selection response
    pub const fn new(
        power_on_data: Option<String>,
        select_application_response: Option<ApduResponse>,
        has_matched: bool,
        card_response: Option<CardResponse>,
    ) -> Self {
        Self {
            power_on_data,
            select_application_response,
            has_matched,
            card_response,
        }
    }

    /// Power-on data (ATR as hex text) reported by the reader
    pub fn power_on_data(&self) -> Option<&str> {
        self.power_on_data.as_deref()
    }

    /// Response to the SELECT APPLICATION command, if one was sent
    pub const fn select_application_response(&self) -> Option<&ApduResponse> {
        self.select_application_response.as_ref()
    }

    /// Whether the card matched the selector
    pub const fn has_matched(&self) -> bool {
        self.has_matched
    }

    /// Responses to the follow-up card request, if one was executed
    pub const fn card_response(&self) -> Option<&CardResponse> {
        self.card_response.as_ref()
    }
}

/// Card-profile specific side of the selection
///
/// One implementation exists per card profile. The extension provides the selection request and
/// builds its smart card from the selection response.
pub trait CardSelectionExtension {
    /// Smart card built by the extension
    type Card: SmartCard;

    /// Selection request prepared for this selection, returned as is
    fn card_selection_request(&self) -> &CardSelectionRequest;

    /// Build the smart card from the selection response
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the response cannot be interpreted.
    fn parse(&self, response: &CardSelectionResponse) -> Result<Self::Card, ParseError>;
}

/// Result of [`CardSelectionResolver::process`]
#[derive(Debug)]
pub enum SelectionOutcome<C> {
    /// The card matched and the extension built its smart card
    Matched {
        /// Smart card built by the extension
        card: C,
        /// Selection response given to the extension
        response: CardSelectionResponse,
    },
    /// The card did not match the selector; the extension was not called
    NotMatched(CardSelectionResponse),
}

impl<C> SelectionOutcome<C> {
    /// Selection response, matched or not
    pub const fn response(&self) -> &CardSelectionResponse {
        match self {
            Self::Matched { response, .. } | Self::NotMatched(response) => response,
        }
    }

    /// Smart card, if the card matched
    pub fn into_card(self) -> Option<C> {
        match self {
            Self::Matched { card, .. } => Some(card),
            Self::NotMatched(_) => None,
        }
    }
}

/// Runs card selections on a reader
#[derive(Debug)]
pub struct CardSelectionResolver<'a, P: ProxyReader + ?Sized> {
    reader: &'a mut P,
}

impl<'a, P: ProxyReader + ?Sized> CardSelectionResolver<'a, P> {
    /// Create a resolver working on `reader`
    pub const fn new(reader: &'a mut P) -> Self {
        Self { reader }
    }

    /// Select the card described by `extension` and let the extension build its smart card
    ///
    /// The SELECT APPLICATION command, when the selector has an AID, is sent with the channel
    /// kept open. On a match, the follow-up card request is sent with `channel_control`, or the
    /// policy is applied directly when there is none. Without a match the channel is released
    /// and the extension is not called. The extension's [`ParseError`] is returned unchanged
    /// inside [`Error::Parse`](crate::Error::Parse).
    ///
    /// # Errors
    /// Transmission failures, reader failures while releasing the channel, or the parse error
    /// of the extension.
    #[instrument(level = "debug", skip_all, fields(channel_control = %channel_control))]
    pub fn process<E: CardSelectionExtension>(
        &mut self,
        extension: &E,
        channel_control: ChannelControl,
    ) -> Result<SelectionOutcome<E::Card>> {
        let request = extension.card_selection_request();
        let selector = request.card_selector();
        let power_on_data = self.reader.power_on_data();

        let select_application_response = match selector
            .select_application_request()
            .context("Failed to build the SELECT APPLICATION command")?
        {
            Some(select) => {
                let select_request = CardRequest::new(vec![select], false)?;
                self.reader
                    .transmit_card_request(&select_request, ChannelControl::KeepOpen)?
                    .into_apdu_responses()
                    .into_iter()
                    .next()
            }
            None => None,
        };

        let has_matched = select_application_response
            .as_ref()
            .is_none_or(|response| selector.is_successful_selection(response.status_word()));

        if !has_matched {
            debug!("Card did not match the selector");
            self.reader.release_channel()?;
            return Ok(SelectionOutcome::NotMatched(CardSelectionResponse::new(
                power_on_data,
                select_application_response,
                false,
                None,
            )));
        }

        let card_response = match request.card_request() {
            Some(card_request) => Some(
                self.reader
                    .transmit_card_request(card_request, channel_control)?,
            ),
            None => {
                if channel_control.closes_channel() {
                    self.reader.release_channel()?;
                }
                None
            }
        };

        let response = CardSelectionResponse::new(
            power_on_data,
            select_application_response,
            true,
            card_response,
        );
        let card = extension.parse(&response)?;
        debug!(?card, "Card selected");

        Ok(SelectionOutcome::Matched { card, response })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::proxy::CardProxy;
    use crate::reader::mock::MockReader;
    use crate::{ApduRequest, Error};
    use bytes::Bytes;
    use hex_literal::hex;

    #[derive(Debug, PartialEq)]
    struct TestCard {
        fci: Bytes,
    }

    impl SmartCard for TestCard {}

    #[derive(Debug)]
    struct TestExtension {
        request: CardSelectionRequest,
        parse_calls: Cell<usize>,
        reject: bool,
    }

    impl TestExtension {
        fn new(request: CardSelectionRequest) -> Self {
            Self {
                request,
                parse_calls: Cell::new(0),
                reject: false,
            }
        }
    }

    impl CardSelectionExtension for TestExtension {
        type Card = TestCard;

        fn card_selection_request(&self) -> &CardSelectionRequest {
            &self.request
        }

        fn parse(&self, response: &CardSelectionResponse) -> Result<TestCard, ParseError> {
            self.parse_calls.set(self.parse_calls.get() + 1);
            if self.reject {
                return Err(ParseError::new("unsupported FCI"));
            }
            let fci = response
                .select_application_response()
                .map(|r| r.data_out().clone())
                .unwrap_or_default();
            Ok(TestCard { fci })
        }
    }

    fn aid_selector() -> CardSelector {
        CardSelector::new()
            .filter_by_aid(Bytes::copy_from_slice(&hex!("A000000404012509")))
            .unwrap()
    }

    #[test]
    fn test_card_selection_request_returned_as_is() {
        let request = CardSelectionRequest::new(aid_selector());
        let extension = TestExtension::new(request.clone());
        assert_eq!(extension.card_selection_request(), &request);
        assert!(request.card_request().is_none());
    }

    #[test]
    fn test_matched_selection() {
        let reader = MockReader::with_outcomes([Ok(&hex!("6F0384019000")[..])]);
        let mut proxy = CardProxy::new(reader);
        let follow_up = CardRequest::new(
            vec![ApduRequest::try_from(&hex!("00B2014400")[..]).unwrap()],
            true,
        )
        .unwrap();
        let request = CardSelectionRequest::new(aid_selector()).with_card_request(follow_up);
        let extension = TestExtension::new(request);

        let outcome = CardSelectionResolver::new(&mut proxy)
            .process(&extension, ChannelControl::KeepOpen)
            .unwrap();

        assert_eq!(extension.parse_calls.get(), 1);
        let response = outcome.response();
        assert!(response.has_matched());
        assert!(response.power_on_data().is_some());
        assert_eq!(response.card_response().unwrap().len(), 1);
        assert_eq!(
            outcome.into_card(),
            Some(TestCard {
                fci: Bytes::copy_from_slice(&hex!("6F038401"))
            })
        );
        assert_eq!(proxy.reader().commands.len(), 2);
    }

    #[test]
    fn test_not_matched_selection() {
        let reader = MockReader::with_outcomes([Ok(&hex!("6A82")[..])]);
        let mut proxy = CardProxy::new(reader);
        let extension = TestExtension::new(CardSelectionRequest::new(aid_selector()));

        let outcome = CardSelectionResolver::new(&mut proxy)
            .process(&extension, ChannelControl::KeepOpen)
            .unwrap();

        assert_eq!(extension.parse_calls.get(), 0);
        assert!(!outcome.response().has_matched());
        assert_eq!(
            outcome.response().select_application_response().unwrap().status_word(),
            0x6A82
        );
        assert!(outcome.into_card().is_none());
        assert_eq!(proxy.reader().close_calls, 1);
    }

    #[test]
    fn test_parse_error_propagated() {
        let mut proxy = CardProxy::new(MockReader::new());
        let mut extension = TestExtension::new(CardSelectionRequest::new(aid_selector()));
        extension.reject = true;

        let error = CardSelectionResolver::new(&mut proxy)
            .process(&extension, ChannelControl::CloseAfter)
            .unwrap_err();

        assert_eq!(extension.parse_calls.get(), 1);
        match error {
            Error::Parse(parse_error) => assert_eq!(parse_error.message(), "unsupported FCI"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_selection_without_aid_applies_policy() {
        let mut proxy = CardProxy::new(MockReader::new());
        let extension = TestExtension::new(CardSelectionRequest::new(CardSelector::new()));

        let outcome = CardSelectionResolver::new(&mut proxy)
            .process(&extension, ChannelControl::CloseAfter)
            .unwrap();

        assert!(outcome.response().has_matched());
        assert!(outcome.response().select_application_response().is_none());
        assert!(proxy.reader().commands.is_empty());
        assert_eq!(proxy.reader().close_calls, 1);
    }
}
