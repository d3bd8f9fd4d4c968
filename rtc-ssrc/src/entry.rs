use crate::context::{SsrcContext, SsrcDirection};
use crate::lock_order::EntryGuard;
use crate::report::history::ReportHistory;
use crate::report::receiver_report::ReceiverReportRecord;
use crate::report::sender_report::SenderReportRecord;
use crate::report::stats::SsrcStatsBlock;
use crate::report::voip_metrics::VoipMetricsRecord;
use log::trace;
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// History bounds applied to every entry of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HistoryCapacity {
    pub(crate) sender_reports: usize,
    pub(crate) receiver_reports: usize,
    pub(crate) stats_blocks: usize,
}

struct SsrcEntryState {
    input_ctx: SsrcContext,
    output_ctx: SsrcContext,

    /// Sender reports received from this stream.
    sender_reports: ReportHistory<SenderReportRecord>,
    /// Receiver reports about this stream, and what was derived from them.
    receiver_reports: ReportHistory<ReceiverReportRecord>,
    stats_blocks: ReportHistory<SsrcStatsBlock>,

    voip_metrics: Option<VoipMetricsRecord>,
}

impl SsrcEntryState {
    fn context_mut(&mut self, direction: SsrcDirection) -> &mut SsrcContext {
        match direction {
            SsrcDirection::Input => &mut self.input_ctx,
            SsrcDirection::Output => &mut self.output_ctx,
        }
    }
}

/// All state associated with one SSRC for the lifetime of a call.
///
/// Mutable fields live behind the entry's own lock; every method takes the
/// lock for its duration only and hands out copies, never references.
pub struct SsrcEntry {
    ssrc: u32,
    state: Mutex<SsrcEntryState>,
}

impl SsrcEntry {
    pub(crate) fn new(ssrc: u32, capacity: HistoryCapacity) -> Self {
        Self {
            ssrc,
            state: Mutex::new(SsrcEntryState {
                input_ctx: SsrcContext::default(),
                output_ctx: SsrcContext::default(),
                sender_reports: ReportHistory::new(capacity.sender_reports),
                receiver_reports: ReportHistory::new(capacity.receiver_reports),
                stats_blocks: ReportHistory::new(capacity.stats_blocks),
                voip_metrics: None,
            }),
        }
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    fn lock(&self) -> EntryGuard<'_, SsrcEntryState> {
        EntryGuard::lock(&self.state)
    }

    /// Runs `f` with exclusive access to one directional crypto context.
    ///
    /// `f` must not call back into the registry; see the crate docs on lock
    /// order.
    pub fn with_context<R>(
        &self,
        direction: SsrcDirection,
        f: impl FnOnce(&mut SsrcContext) -> R,
    ) -> R {
        let mut state = self.lock();
        f(state.context_mut(direction))
    }

    /// Appends to the sender report history, dropping the oldest record once
    /// the history is full.
    pub fn record_sender_report(&self, record: SenderReportRecord) {
        let mut state = self.lock();
        if let Some(evicted) = state.sender_reports.push(record) {
            trace!(
                "ssrc {:#010x}: sender report {:#010x} aged out",
                self.ssrc,
                evicted.ntp_middle_bits()
            );
        }
    }

    /// Most recently stored sender report whose NTP middle bits equal
    /// `middle_bits`.
    pub fn find_matching_sender_report(&self, middle_bits: u32) -> Option<SenderReportRecord> {
        let state = self.lock();
        state
            .sender_reports
            .iter_newest_first()
            .find(|sr| sr.ntp_middle_bits() == middle_bits)
            .copied()
    }

    /// Retained sender reports, oldest first.
    pub fn sender_reports(&self) -> Vec<SenderReportRecord> {
        self.lock().sender_reports.to_vec()
    }

    /// Stores a receiver report about this stream together with the stats
    /// block derived from it, under a single lock acquisition.
    pub fn record_receiver_report(&self, record: ReceiverReportRecord, rtt: Option<Duration>) {
        let block = SsrcStatsBlock::new(record.report(), record.received(), rtt);
        let mut state = self.lock();
        state.receiver_reports.push(record);
        state.stats_blocks.push(block);
    }

    /// Retained receiver reports, oldest first.
    pub fn receiver_reports(&self) -> Vec<ReceiverReportRecord> {
        self.lock().receiver_reports.to_vec()
    }

    /// Retained stats blocks, oldest first.
    pub fn stats_blocks(&self) -> Vec<SsrcStatsBlock> {
        self.lock().stats_blocks.to_vec()
    }

    pub fn latest_stats(&self) -> Option<SsrcStatsBlock> {
        self.lock().stats_blocks.newest().copied()
    }

    /// Replaces the stored XR VoIP metrics block.
    pub fn record_voip_metrics(&self, record: VoipMetricsRecord) {
        self.lock().voip_metrics = Some(record);
    }

    pub fn voip_metrics(&self) -> Option<VoipMetricsRecord> {
        self.lock().voip_metrics
    }
}

impl fmt::Debug for SsrcEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SsrcEntry")
            .field("ssrc", &self.ssrc)
            .field("input_ctx", &state.input_ctx)
            .field("output_ctx", &state.output_ctx)
            .field("sender_reports", &state.sender_reports.len())
            .field("receiver_reports", &state.receiver_reports.len())
            .finish()
    }
}
