use std::ops::Add;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Offset in seconds between the NTP epoch (1900) and the unix epoch (1970).
const NTP_UNIX_OFFSET_SECS: u64 = 0x83AA7E80;

/// Anchors a monotonic [`Instant`] to wall-clock time so that local receipt
/// times can be expressed as NTP timestamps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemInstant {
    instant: Instant,
    duration_since_unix_epoch: Duration,
}

impl SystemInstant {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            duration_since_unix_epoch: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0)),
        }
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn unix(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.instant)
            .add(self.duration_since_unix_epoch)
    }

    pub fn ntp(&self, now: Instant) -> u64 {
        SystemInstant::unix2ntp(self.unix(now))
    }

    pub fn unix2ntp(duration_since_unix_epoch: Duration) -> u64 {
        let s = duration_since_unix_epoch.as_secs() + NTP_UNIX_OFFSET_SECS;
        let f = ((duration_since_unix_epoch.subsec_nanos() as u64) << 32) / 1_000_000_000;

        (s << 32) | f
    }
}

/// Splits a 64-bit NTP timestamp into its most and least significant words.
pub fn ntp_split(ntp: u64) -> (u32, u32) {
    ((ntp >> 32) as u32, ntp as u32)
}

/// Middle 32 bits of an NTP timestamp, the value RTCP receiver reports echo
/// back as LSR.
pub fn ntp_middle_bits(ntp_msw: u32, ntp_lsw: u32) -> u32 {
    (ntp_msw << 16) | (ntp_lsw >> 16)
}

/// NTP timestamp as fractional seconds since the NTP epoch.
pub fn ntp_to_f64(ntp_msw: u32, ntp_lsw: u32) -> f64 {
    ntp_msw as f64 + ntp_lsw as f64 / (1u64 << 32) as f64
}

/// Converts a 16.16 fixed point value (DLSR, in units of 1/65536 s) to a
/// [`Duration`].
pub fn compact_ntp_to_duration(compact: u32) -> Duration {
    let secs = (compact >> 16) as u64;
    let nanos = ((compact & 0xFFFF) as u64 * 1_000_000_000) >> 16;
    Duration::new(secs, nanos as u32)
}
