use std::time::Instant;

/// RTCP XR VoIP Metrics report block (RFC 3611 4.7).
///
/// Stored exactly as parsed; nothing here is derived or validated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VoipMetrics {
    pub ssrc: u32,
    pub loss_rate: u8,
    pub discard_rate: u8,
    pub burst_den: u8,
    pub gap_den: u8,
    pub burst_dur: u16,
    pub gap_dur: u16,
    pub rnd_trip_delay: u16,
    pub end_sys_delay: u16,
    pub signal_lvl: u8,
    pub noise_lvl: u8,
    pub rerl: u8,
    pub gmin: u8,
    pub r_factor: u8,
    pub ext_r_factor: u8,
    pub mos_lq: u8,
    pub mos_cq: u8,
    pub rx_config: u8,
    pub jb_nom: u16,
    pub jb_max: u16,
    pub jb_abs_max: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoipMetricsRecord {
    received: Instant,
    metrics: VoipMetrics,
}

impl VoipMetricsRecord {
    pub fn new(metrics: VoipMetrics, received: Instant) -> Self {
        Self { received, metrics }
    }

    pub fn received(&self) -> Instant {
        self.received
    }

    pub fn metrics(&self) -> &VoipMetrics {
        &self.metrics
    }
}
