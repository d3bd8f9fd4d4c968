use super::receiver_report::ReceiverReport;
use std::time::{Duration, Instant};

/// Quality figures derived from one receiver report about a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsrcStatsBlock {
    /// Local time the underlying receiver report arrived.
    pub reported: Instant,
    /// Interarrival jitter in RTP timestamp units, as reported.
    pub jitter: u32,
    pub fraction_lost: u8,
    pub packets_lost: u32,
    pub high_seq_received: u32,
    /// Round-trip time, `None` when no matching sender report was retained.
    pub rtt: Option<Duration>,
}

impl SsrcStatsBlock {
    pub fn new(rr: &ReceiverReport, reported: Instant, rtt: Option<Duration>) -> Self {
        Self {
            reported,
            jitter: rr.jitter,
            fraction_lost: rr.fraction_lost,
            packets_lost: rr.packets_lost,
            high_seq_received: rr.high_seq_received,
            rtt,
        }
    }
}
