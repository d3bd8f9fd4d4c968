//! Report Reconciler - folds incoming RTCP reports into a call's registry.
//!
//! Round-trip time is derived as described in
//! [RFC3550 6.4.1](https://datatracker.ietf.org/doc/html/rfc3550#section-6.4.1):
//!
//! ```text
//!  reporting peer            relay
//!       |  <------- SR(n) -------  |  T0, middle bits M stored
//!       |                          |
//!       |<-DLSR->|                 |
//!       |        --- RR(lsr=M) --> |  T1
//!
//!  rtt = (T1 - T0) - DLSR
//! ```
//!
//! The SR echoed by a receiver report is looked up in the history of the
//! entry keyed by the report's `from` SSRC.

use crate::registry::SsrcRegistry;
use crate::report::receiver_report::{ReceiverReport, ReceiverReportRecord};
use crate::report::sender_report::{SenderReport, SenderReportRecord};
use crate::report::voip_metrics::{VoipMetrics, VoipMetricsRecord};
use log::{debug, trace};
use shared::error::Result;
use std::time::{Duration, Instant};

/// Records a sender report on the entry of the stream that sent it.
pub fn on_sender_report(registry: &SsrcRegistry, sr: &SenderReport, now: Instant) -> Result<()> {
    let record = SenderReportRecord::new(*sr, now);
    trace!(
        "[{}] SR from {:#010x}: ntp {:#010x}.{:#010x} rtp {} packets {} octets {}",
        registry.call_id(),
        sr.ssrc,
        sr.ntp_msw,
        sr.ntp_lsw,
        sr.timestamp,
        sr.packet_count,
        sr.octet_count
    );

    let entry = registry.get_or_create(sr.ssrc)?;
    entry.record_sender_report(record);
    Ok(())
}

/// Processes a receiver report, returning the measured round-trip time.
///
/// `Ok(None)` means no measurement could be made from this report; that is
/// expected whenever the echoed sender report is unknown or has aged out.
/// The report and the figures derived from it are stored on the entry of the
/// stream being reported on.
pub fn on_receiver_report(
    registry: &SsrcRegistry,
    rr: &ReceiverReport,
    now: Instant,
) -> Result<Option<Duration>> {
    trace!(
        "[{}] RR from {:#010x} about {:#010x}: lost {}/256 total {} seq {} jitter {} lsr {:#010x} dlsr {:#010x}",
        registry.call_id(),
        rr.from,
        rr.ssrc,
        rr.fraction_lost,
        rr.packets_lost,
        rr.high_seq_received,
        rr.jitter,
        rr.lsr,
        rr.dlsr
    );

    // the sender entry's lock is released before the reported-on entry is
    // resolved
    let rtt = round_trip_time(registry, rr, now)?;

    let entry = registry.get_or_create(rr.ssrc)?;
    entry.record_receiver_report(ReceiverReportRecord::new(*rr, now), rtt);

    Ok(rtt)
}

/// Stores an XR VoIP metrics block on the entry of the stream it describes.
pub fn on_voip_metrics(
    registry: &SsrcRegistry,
    metrics: &VoipMetrics,
    now: Instant,
) -> Result<()> {
    trace!(
        "[{}] XR VoIP metrics for {:#010x}: loss {} discard {} rtd {} mos-lq {} mos-cq {}",
        registry.call_id(),
        metrics.ssrc,
        metrics.loss_rate,
        metrics.discard_rate,
        metrics.rnd_trip_delay,
        metrics.mos_lq,
        metrics.mos_cq
    );

    let entry = registry.get_or_create(metrics.ssrc)?;
    entry.record_voip_metrics(VoipMetricsRecord::new(*metrics, now));
    Ok(())
}

fn round_trip_time(
    registry: &SsrcRegistry,
    rr: &ReceiverReport,
    now: Instant,
) -> Result<Option<Duration>> {
    let call_id = registry.call_id();

    // RFC 3550: LSR is zero until the reporter has seen a sender report
    if rr.lsr == 0 {
        debug!(
            "[{}] RR from {:#010x}: no SR received by reporter yet, rtt unavailable",
            call_id, rr.from
        );
        return Ok(None);
    }

    let Some(sender) = registry.find(rr.from)? else {
        debug!(
            "[{}] RR from {:#010x}: no SR seen from this SSRC, rtt unavailable",
            call_id, rr.from
        );
        return Ok(None);
    };

    let Some(sr) = sender.find_matching_sender_report(rr.lsr) else {
        debug!(
            "[{}] RR from {:#010x}: no SR matching lsr {:#010x}, rtt unavailable",
            call_id, rr.from, rr.lsr
        );
        return Ok(None);
    };

    let Some(elapsed) = now.checked_duration_since(sr.received()) else {
        debug!(
            "[{}] RR from {:#010x}: received before matching SR, rtt unavailable",
            call_id, rr.from
        );
        return Ok(None);
    };

    let dlsr = rr.dlsr_duration();
    match elapsed.checked_sub(dlsr) {
        Some(rtt) => {
            debug!(
                "[{}] RR from {:#010x} about {:#010x}: rtt {:?}",
                call_id, rr.from, rr.ssrc, rtt
            );
            Ok(Some(rtt))
        }
        None => {
            debug!(
                "[{}] RR from {:#010x}: dlsr {:?} exceeds {:?} since SR, rtt unavailable",
                call_id, rr.from, dlsr, elapsed
            );
            Ok(None)
        }
    }
}
