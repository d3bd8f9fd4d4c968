use shared::time::compact_ntp_to_duration;
use std::time::{Duration, Instant};

/// One reception report block of an RTCP Receiver Report (RFC 3550 6.4.2),
/// tagged with the SSRC of the party that sent it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverReport {
    /// SSRC of the reporting party.
    pub from: u32,
    /// SSRC of the stream being reported on.
    pub ssrc: u32,
    /// Fraction of packets lost since the previous report, in 1/256 units.
    pub fraction_lost: u8,
    /// Cumulative number of packets lost (24 bits on the wire).
    pub packets_lost: u32,
    /// Extended highest sequence number received.
    pub high_seq_received: u32,
    /// Interarrival jitter in RTP timestamp units.
    pub jitter: u32,
    /// Middle 32 bits of the NTP timestamp of the last SR received, 0 if none.
    pub lsr: u32,
    /// Delay since the last SR in units of 1/65536 seconds.
    pub dlsr: u32,
}

impl ReceiverReport {
    /// DLSR expressed as a [`Duration`].
    pub fn dlsr_duration(&self) -> Duration {
        compact_ntp_to_duration(self.dlsr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverReportRecord {
    received: Instant,
    report: ReceiverReport,
}

impl ReceiverReportRecord {
    pub fn new(report: ReceiverReport, received: Instant) -> Self {
        Self { received, report }
    }

    pub fn received(&self) -> Instant {
        self.received
    }

    pub fn report(&self) -> &ReceiverReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dlsr_duration() {
        let rr = ReceiverReport {
            dlsr: 0x0005_4000,
            ..Default::default()
        };
        assert_eq!(rr.dlsr_duration(), Duration::from_millis(5250));
    }
}
