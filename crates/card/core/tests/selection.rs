//! Card selection through a card proxy

mod common;

use std::cell::Cell;

use common::{ATR, Counters, ScriptedReader, init_tracing, read_records};
use hex_literal::hex;
use keypop_card::prelude::*;

const AID: [u8; 8] = hex!("A000000291FF9101");

#[derive(Debug)]
struct CalypsoLikeCard {
    df_name: Bytes,
    power_on_data: String,
    records: usize,
}

impl SmartCard for CalypsoLikeCard {}

/// Extension reading the DF name out of an `6F len 84 len <DF name> ...` FCI
struct DfNameExtension {
    request: CardSelectionRequest,
    parse_calls: Cell<usize>,
}

impl DfNameExtension {
    fn new(request: CardSelectionRequest) -> Self {
        Self {
            request,
            parse_calls: Cell::new(0),
        }
    }
}

impl CardSelectionExtension for DfNameExtension {
    type Card = CalypsoLikeCard;

    fn card_selection_request(&self) -> &CardSelectionRequest {
        &self.request
    }

    fn parse(&self, response: &CardSelectionResponse) -> Result<CalypsoLikeCard, ParseError> {
        self.parse_calls.set(self.parse_calls.get() + 1);

        let fci = response
            .select_application_response()
            .ok_or_else(|| ParseError::new("no FCI"))?
            .data_out();
        let df_name = match fci.as_ref() {
            [0x6F, _, 0x84, len, rest @ ..] if rest.len() >= *len as usize => {
                fci.slice(4..4 + *len as usize)
            }
            _ => return Err(ParseError::new("missing DF name")),
        };

        Ok(CalypsoLikeCard {
            df_name,
            power_on_data: response.power_on_data().unwrap_or_default().to_string(),
            records: response.card_response().map_or(0, CardResponse::len),
        })
    }
}

fn selector() -> CardSelector {
    CardSelector::new()
        .filter_by_aid(Bytes::from_static(&AID))
        .unwrap()
        .add_successful_selection_status_word(0x6283)
}

#[test]
fn test_select_and_read() {
    init_tracing();

    let counters = Counters::default();
    let reader = ScriptedReader::new(&counters)
        .respond(&hex!("6F0A8408A000000291FF91019000"))
        .respond(&hex!("01029000"))
        .respond(&hex!("03049000"));
    let mut proxy = CardProxy::new(reader);
    let extension = DfNameExtension::new(
        CardSelectionRequest::new(selector()).with_card_request(read_records(2, true)),
    );

    let card = CardSelectionResolver::new(&mut proxy)
        .process(&extension, ChannelControl::CloseAfter)
        .unwrap()
        .into_card()
        .unwrap();

    assert_eq!(card.df_name.as_ref(), &AID);
    assert_eq!(card.power_on_data, ATR);
    assert_eq!(card.records, 2);
    assert_eq!(extension.parse_calls.get(), 1);
    assert_eq!(counters.sent(), 3);
    assert_eq!(counters.closed(), 1);
    assert!(!proxy.is_logical_channel_open());
}

#[test]
fn test_deactivated_application_matches() {
    let counters = Counters::default();
    let reader = ScriptedReader::new(&counters).respond(&hex!("6F0A8408A000000291FF91016283"));
    let mut proxy = CardProxy::new(reader);
    let extension = DfNameExtension::new(CardSelectionRequest::new(selector()));

    let outcome = CardSelectionResolver::new(&mut proxy)
        .process(&extension, ChannelControl::KeepOpen)
        .unwrap();

    assert!(outcome.response().has_matched());
    assert!(outcome.response().card_response().is_none());
    assert_eq!(counters.closed(), 0);
    assert!(proxy.is_logical_channel_open());
}

#[test]
fn test_unknown_application_not_matched() {
    let counters = Counters::default();
    let reader = ScriptedReader::new(&counters).respond(&hex!("6A82"));
    let mut proxy = CardProxy::new(reader);
    let extension = DfNameExtension::new(
        CardSelectionRequest::new(selector()).with_card_request(read_records(2, true)),
    );

    let outcome = CardSelectionResolver::new(&mut proxy)
        .process(&extension, ChannelControl::KeepOpen)
        .unwrap();

    assert!(matches!(outcome, SelectionOutcome::NotMatched(_)));
    assert_eq!(extension.parse_calls.get(), 0);
    assert_eq!(counters.sent(), 1);
    assert_eq!(counters.closed(), 1);
}

#[test]
fn test_parse_error_returned_unchanged() {
    let counters = Counters::default();
    let reader = ScriptedReader::new(&counters).respond(&hex!("6F009000"));
    let mut proxy = CardProxy::new(reader);
    let extension = DfNameExtension::new(CardSelectionRequest::new(selector()));

    let error = CardSelectionResolver::new(&mut proxy)
        .process(&extension, ChannelControl::KeepOpen)
        .unwrap_err();

    // FCI template without DF name
    assert!(matches!(error, Error::Parse(ref e) if e.message() == "missing DF name"));
    assert_eq!(extension.parse_calls.get(), 1);
}

#[test]
fn test_card_removed_during_selection() {
    let counters = Counters::default();
    let reader = ScriptedReader::new(&counters).fail(ReaderError::CardRemoved);
    let mut proxy = CardProxy::new(reader);
    let extension = DfNameExtension::new(CardSelectionRequest::new(selector()));

    let error = CardSelectionResolver::new(&mut proxy)
        .process(&extension, ChannelControl::KeepOpen)
        .unwrap_err();

    let transmission = error.as_transmission().unwrap();
    assert_eq!(transmission.kind(), TransmissionErrorKind::CardCommunication);
    assert!(transmission.card_response().is_empty());
    assert_eq!(extension.parse_calls.get(), 0);
}
