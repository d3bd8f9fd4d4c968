use shared::time::{ntp_middle_bits, ntp_split, ntp_to_f64};
use std::time::Instant;

/// Fields of an RTCP Sender Report (RFC 3550 6.4.1) as handed over by the
/// RTCP parser.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SenderReport {
    /// SSRC of the stream that sent the report.
    pub ssrc: u32,
    /// Integer seconds part of the NTP timestamp.
    pub ntp_msw: u32,
    /// Fractional part of the NTP timestamp.
    pub ntp_lsw: u32,
    /// RTP timestamp corresponding to the NTP timestamp.
    pub timestamp: u32,
    /// Sender's packet count.
    pub packet_count: u32,
    /// Sender's octet count.
    pub octet_count: u32,
    /// NTP timestamp as fractional seconds.
    pub ntp_ts: f64,
}

impl SenderReport {
    /// Builds a report from a combined 64-bit NTP timestamp.
    pub fn new(ssrc: u32, ntp: u64, timestamp: u32, packet_count: u32, octet_count: u32) -> Self {
        let (ntp_msw, ntp_lsw) = ntp_split(ntp);
        Self {
            ssrc,
            ntp_msw,
            ntp_lsw,
            timestamp,
            packet_count,
            octet_count,
            ntp_ts: ntp_to_f64(ntp_msw, ntp_lsw),
        }
    }

    /// Middle 32 bits of the NTP timestamp, reassembled from the raw words.
    pub fn ntp_middle_bits(&self) -> u32 {
        ntp_middle_bits(self.ntp_msw, self.ntp_lsw)
    }
}

/// A sender report as kept in an entry's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenderReportRecord {
    received: Instant,
    ntp_middle_bits: u32,
    report: SenderReport,
}

impl SenderReportRecord {
    pub fn new(report: SenderReport, received: Instant) -> Self {
        Self {
            received,
            ntp_middle_bits: report.ntp_middle_bits(),
            report,
        }
    }

    /// Local time the report arrived.
    pub fn received(&self) -> Instant {
        self.received
    }

    /// Correlation key matched against a receiver report's LSR.
    pub fn ntp_middle_bits(&self) -> u32 {
        self.ntp_middle_bits
    }

    pub fn report(&self) -> &SenderReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_report_from_ntp() {
        let sr = SenderReport::new(0x1234, 0xb44db705_20000000, 90000, 10, 1200);

        assert_eq!(sr.ntp_msw, 0xb44db705);
        assert_eq!(sr.ntp_lsw, 0x20000000);
        assert_eq!(sr.ntp_ts, 0xb44db705u32 as f64 + 0.125);
        assert_eq!(sr.ntp_middle_bits(), 0xb7052000);
    }

    #[test]
    fn test_sender_report_record_keeps_middle_bits() {
        let now = Instant::now();
        let sr = SenderReport {
            ssrc: 7,
            ntp_msw: 0x0001_0002,
            ntp_lsw: 0x0003_0004,
            ..Default::default()
        };
        let record = SenderReportRecord::new(sr, now);

        assert_eq!(record.received(), now);
        assert_eq!(record.ntp_middle_bits(), 0x0002_0003);
        assert_eq!(record.report().ssrc, 7);
    }
}
