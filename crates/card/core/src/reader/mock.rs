//! In-memory reader used by the unit tests

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;

use super::{ReaderDriver, ReaderError, RemovalSequencer};

/// Reader answering with scripted outcomes, one per sent command
#[derive(Debug, Default)]
pub(crate) struct MockReader {
    /// Outcomes returned in order; `9000` once exhausted
    pub(crate) outcomes: VecDeque<Result<Bytes, ReaderError>>,
    /// Commands received so far
    pub(crate) commands: Vec<Bytes>,
    /// Physical channel state
    pub(crate) open: bool,
    /// Number of `close` calls
    pub(crate) close_calls: usize,
    /// Failure returned by `close`
    pub(crate) close_failure: Option<ReaderError>,
}

impl MockReader {
    /// Open reader answering `9000` to everything
    pub(crate) fn new() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    /// Open reader answering with the given outcomes
    pub(crate) fn with_outcomes<'a>(
        outcomes: impl IntoIterator<Item = Result<&'a [u8], ReaderError>>,
    ) -> Self {
        Self {
            outcomes: outcomes
                .into_iter()
                .map(|outcome| outcome.map(Bytes::copy_from_slice))
                .collect(),
            ..Self::new()
        }
    }
}

impl ReaderDriver for MockReader {
    fn do_send(&mut self, command: &[u8]) -> Result<Bytes, ReaderError> {
        self.commands.push(Bytes::copy_from_slice(command));
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(&[0x90, 0x00])))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        self.close_calls += 1;
        match self.close_failure.clone() {
            Some(failure) => Err(failure),
            None => {
                self.open = false;
                Ok(())
            }
        }
    }

    fn power_on_data(&self) -> Option<String> {
        Some("3B8880010000000000718100F9".to_string())
    }
}

/// Removal sequencer counting its invocations
#[derive(Debug, Default)]
pub(crate) struct MockSequencer {
    pub(crate) started: Arc<AtomicUsize>,
}

impl RemovalSequencer for MockSequencer {
    fn start_removal_sequence(&mut self) -> Result<(), ReaderError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
