//! Example selecting an application and reading records on a simulated card
//!
//! Run with `RUST_LOG=keypop_card=trace` to follow the exchanges.

use keypop_card::prelude::*;
use tracing_subscriber::EnvFilter;

const AID: &[u8] = &[0xA0, 0x00, 0x00, 0x04, 0x04, 0x01, 0x25, 0x09];

/// Simulated card answering SELECT APPLICATION and READ RECORD
#[derive(Debug)]
struct SimulatedReader {
    open: bool,
}

impl ReaderDriver for SimulatedReader {
    fn do_send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError> {
        let response = match command {
            [0x00, 0xA4, 0x04, _, len, aid @ ..]
                if *len as usize == AID.len() && aid.starts_with(AID) =>
            {
                let mut fci = vec![0x6F, 0x02 + AID.len() as u8, 0x84, AID.len() as u8];
                fci.extend_from_slice(AID);
                fci.extend_from_slice(&[0x90, 0x00]);
                fci
            }
            [0x00, 0xA4, ..] => vec![0x6A, 0x82],
            [0x00, 0xB2, 0x01..=0x03, ..] => vec![0x00, command[2], 0x90, 0x00],
            [0x00, 0xB2, ..] => vec![0x6A, 0x83],
            _ => vec![0x6D, 0x00],
        };
        Ok(Bytes::from(response))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        self.open = false;
        Ok(())
    }

    fn power_on_data(&self) -> Option<String> {
        Some("3B8880010000000000718100F9".to_string())
    }
}

#[derive(Debug)]
struct DemoCard {
    df_name: String,
    records: Vec<Bytes>,
}

impl SmartCard for DemoCard {}

struct DemoExtension {
    request: CardSelectionRequest,
}

impl CardSelectionExtension for DemoExtension {
    type Card = DemoCard;

    fn card_selection_request(&self) -> &CardSelectionRequest {
        &self.request
    }

    fn parse(&self, response: &CardSelectionResponse) -> Result<DemoCard, ParseError> {
        let fci = response
            .select_application_response()
            .ok_or_else(|| ParseError::new("no FCI"))?
            .data_out();
        let df_name = fci
            .get(4..)
            .ok_or_else(|| ParseError::new("FCI too short"))?;
        let records = response
            .card_response()
            .map(|r| {
                r.apdu_responses()
                    .iter()
                    .filter(|a| a.status().is_success())
                    .map(|a| a.data_out().clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(DemoCard {
            df_name: hex::encode_upper(df_name),
            records,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Card API version {}", keypop_card::properties::api_version());

    let mut proxy = CardProxy::new(SimulatedReader { open: true });

    // Read every record until the card reports the end of the file
    let read_records = (1..=4u8)
        .map(|record| {
            ApduRequest::new(vec![0x00, 0xB2, record, 0x44, 0x00])
                .map(|request| request.with_info(format!("Read Record {record}")))
        })
        .collect::<Result<Vec<_>>>()?;
    let extension = DemoExtension {
        request: CardSelectionRequest::new(CardSelector::new().filter_by_aid(AID)?)
            .with_card_request(CardRequest::new(read_records, true)?),
    };

    let outcome =
        CardSelectionResolver::new(&mut proxy).process(&extension, ChannelControl::KeepOpen)?;
    match outcome {
        SelectionOutcome::Matched { card, response } => {
            println!("Selected {} on card {:?}", card.df_name, response.power_on_data());
            for (index, record) in card.records.iter().enumerate() {
                println!("  record {}: {}", index + 1, hex::encode_upper(record));
            }
        }
        SelectionOutcome::NotMatched(response) => {
            println!("No match: {:?}", response.select_application_response());
            return Ok(());
        }
    }

    // Unknown instruction: the status word is recorded, not raised
    let get_data = ApduRequest::new(vec![0x80, 0xCA, 0x9F, 0x7F, 0x00])?;
    let get_data = CardRequest::new(vec![get_data], false)?;
    let response = proxy.transmit_card_request(&get_data, ChannelControl::CloseAfter)?;
    println!("{response}");
    println!("Logical channel open: {}", proxy.is_logical_channel_open());

    Ok(())
}
