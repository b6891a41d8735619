//! Progress events sent to an observer while a run is in flight.

use tokio::sync::mpsc;

/// Informational phase of an in-flight run. Progress within a phase is indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Receiving the archive.
    Fetching,
    /// Unpacking, merging and writing attribution.
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    /// Archive bytes received so far.
    pub bytes_received: u64,
}

/// Fetching events are coalesced to one per this many bytes.
pub(super) const FETCH_REPORT_EVERY: u64 = 256 * 1024;

/// Best-effort sender: a full or closed channel never stalls the run.
#[derive(Debug, Clone, Default)]
pub(super) struct Reporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Reporter {
    pub(super) fn new(tx: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        Self { tx }
    }

    pub(super) fn report(&self, phase: Phase, bytes_received: u64) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(ProgressEvent {
                phase,
                bytes_received,
            });
        }
    }

    /// Callback for the transfer: reports whenever another
    /// `FETCH_REPORT_EVERY` bytes have arrived.
    pub(super) fn fetch_callback(&self) -> impl FnMut(u64) + '_ {
        let mut next = FETCH_REPORT_EVERY;
        move |received| {
            if received >= next {
                self.report(Phase::Fetching, received);
                next = (received / FETCH_REPORT_EVERY + 1) * FETCH_REPORT_EVERY;
            }
        }
    }
}
