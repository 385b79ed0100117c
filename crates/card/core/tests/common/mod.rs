//! Common test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use keypop_card::prelude::*;

/// Power-on data reported by [`ScriptedReader`]
pub const ATR: &str = "3B8F8001804F0CA000000306030001000000006A";

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Counters shared between a test and the reader it handed to a proxy
#[derive(Debug, Default, Clone)]
pub struct Counters {
    pub sent: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub removal_sequences: Arc<AtomicUsize>,
}

impl Counters {
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn removal_sequences(&self) -> usize {
        self.removal_sequences.load(Ordering::SeqCst)
    }
}

/// Reader answering with scripted outcomes, `9000` once the script is exhausted
#[derive(Debug)]
pub struct ScriptedReader {
    script: VecDeque<Result<Bytes, ReaderError>>,
    counters: Counters,
    open: bool,
}

impl ScriptedReader {
    pub fn new(counters: &Counters) -> Self {
        Self {
            script: VecDeque::new(),
            counters: counters.clone(),
            open: true,
        }
    }

    /// Queue a raw response
    pub fn respond(mut self, response: &[u8]) -> Self {
        self.script.push_back(Ok(Bytes::copy_from_slice(response)));
        self
    }

    /// Queue a driver failure
    pub fn fail(mut self, error: ReaderError) -> Self {
        self.script.push_back(Err(error));
        self
    }
}

impl ReaderDriver for ScriptedReader {
    fn do_send(&mut self, _command: &[u8]) -> Result<Bytes, ReaderError> {
        self.counters.sent.fetch_add(1, Ordering::SeqCst);
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(&[0x90, 0x00])))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.open = false;
        Ok(())
    }

    fn power_on_data(&self) -> Option<String> {
        Some(ATR.to_string())
    }
}

/// Removal sequencer counting its invocations
#[derive(Debug)]
pub struct CountingSequencer(pub Counters);

impl RemovalSequencer for CountingSequencer {
    fn start_removal_sequence(&mut self) -> Result<(), ReaderError> {
        self.0.removal_sequences.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `00B2 rr 44 00` READ RECORD commands, records numbered from 1
pub fn read_records(count: usize, stop_on_unsuccessful_status_word: bool) -> CardRequest {
    let apdus = (1..=count)
        .map(|record| ApduRequest::try_from(&[0x00, 0xB2, record as u8, 0x44, 0x00][..]).unwrap())
        .collect();
    CardRequest::new(apdus, stop_on_unsuccessful_status_word).unwrap()
}
